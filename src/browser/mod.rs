pub mod connection;
pub mod headless;
pub mod host;

use chromiumoxide::Handler;
use futures::StreamExt;
use tracing::debug;

pub use connection::{connect_to_browser, find_open_page, warn_if_not_ready};
pub use headless::launch_headless_browser;
pub use host::ChromeHost;

/// 在后台处理浏览器事件，连接断开时退出
pub(crate) fn spawn_handler(mut handler: Handler) {
    tokio::spawn(async move {
        while let Some(h) = handler.next().await {
            if h.is_err() {
                debug!("浏览器事件循环结束");
                break;
            }
        }
    });
}
