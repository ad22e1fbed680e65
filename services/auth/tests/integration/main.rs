mod helpers;
mod http_test;
mod sweep_test;
