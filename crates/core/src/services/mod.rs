pub mod news_service;
pub mod portfolio_service;
pub mod ratio_service;
pub mod statement_service;
