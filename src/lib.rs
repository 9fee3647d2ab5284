// KLAVIER — virtual musical keyboard core
// Copyright (C) 2026  Klavier contributors
//
// This library is free software; you can redistribute it and/or
// modify it under the terms of the GNU Lesser General Public
// License as published by the Free Software Foundation; either
// version 2.1 of the License, or (at your option) any later version.
//
// This library is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU
// Lesser General Public License for more details.
//
// You should have received a copy of the GNU Lesser General Public
// License along with this library; if not, write to the Free Software
// Foundation, Inc., 51 Franklin Street, Fifth Floor, Boston, MA  02110-1301
// USA

//! Core of a virtual musical keyboard: translates physical input keys into
//! pitched notes under two layout families (scale-aware "Flex" and fixed
//! chromatic), and synthesizes the result through a bounded pool of
//! envelope-shaped voices feeding a shared master chain.
//!
//! Rendering of the on-screen keyboard, toggle wiring and other UI glue are
//! collaborators; they consume the note names and highlight events produced
//! here and feed raw key identifiers back in.

pub mod config;
pub mod controller;
pub mod engine;
pub mod layout;
pub mod mapper;
pub mod pitch;
