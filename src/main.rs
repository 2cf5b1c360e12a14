use async_std::task;
use finch::config::{ServerConfig, set_config};
use finch::net::server::Server;

fn main() -> std::io::Result<()> {
    set_config(ServerConfig::default());
    task::block_on(Server::run())
}
