mod support;
mod sweeper_tests;
