pub mod check_jwt;
