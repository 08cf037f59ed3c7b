// src/core/mod.rs

pub mod compiler;
pub mod dispatcher;
pub mod modifier;
pub mod raw;
pub mod tree;
