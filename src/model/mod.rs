pub mod issue;
pub mod status;

#[cfg(test)]
pub mod fixtures;
