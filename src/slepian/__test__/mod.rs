pub mod pipeline_test;
