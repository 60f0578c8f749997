pub mod nlms;
