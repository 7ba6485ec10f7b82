/// Memory source and root value selection shared by commands.
pub mod source;
/// Region listing command.
pub mod regions;
/// One-line value summary command.
pub mod summary;
/// Recursive tree command.
pub mod tree;
/// Type registration command.
pub mod types;

mod print;
#[cfg(test)]
mod test_support;
mod util;
