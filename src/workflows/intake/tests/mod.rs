mod builder;
mod common;
mod service;
