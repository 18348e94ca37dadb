pub mod util;

#[cfg(test)]
mod kernel;
