pub mod kdata;
