mod refresh_test;
mod router_test;
mod sweep_test;
mod two_factor_test;
