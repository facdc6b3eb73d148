pub mod test_support;
pub mod time;
