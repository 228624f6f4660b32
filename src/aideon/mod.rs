pub mod tablediff;
