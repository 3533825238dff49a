pub mod bank_test;
