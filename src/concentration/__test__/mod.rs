pub mod matrix_test;
