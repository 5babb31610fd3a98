pub mod dto;
pub mod rest;
pub mod shutdown;
