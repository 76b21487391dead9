mod common;
mod multitest;
