mod accounts;
mod api_key;
mod families;
mod helpers;
mod mocks;
mod shop;
mod walks;
