// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Backend-specific database utilities.
//!
//! Only `SQLite` is supported. Its partial unique indexes and
//! `BEGIN IMMEDIATE` transactions carry the booking invariants, so the
//! queries and mutations are written against `SqliteConnection` directly.

pub mod sqlite;
