#[cfg(test)]
mod helpers;

#[cfg(test)]
mod manager_tests;
