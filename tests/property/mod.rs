// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests Module

mod graph_ordering;
mod network_layout;
