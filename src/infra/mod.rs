pub mod export;
pub mod import;
pub mod snapshot;

#[cfg(test)]
pub(crate) mod test_support;
