pub mod phantom;

use std::cell::RefCell;
use std::sync::Once;

use log::{Level, LevelFilter, Log, Metadata, Record};
use simple_logger::SimpleLogger;

static LOGGER: Once = Once::new();

thread_local! {
    static WARNINGS: RefCell<Option<Vec<String>>> = const { RefCell::new(None) };
}

/// 在 `simple_logger` 之外, 额外记录当前线程上的 `warn` 日志.
struct CaptureLogger {
    inner: SimpleLogger,
}

impl Log for CaptureLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        self.inner.enabled(metadata)
    }

    fn log(&self, record: &Record) {
        if record.level() == Level::Warn {
            WARNINGS.with(|w| {
                if let Some(w) = w.borrow_mut().as_mut() {
                    w.push(record.args().to_string());
                }
            });
        }
        self.inner.log(record);
    }

    fn flush(&self) {
        self.inner.flush();
    }
}

/// 安装日志, 便于用 `--nocapture` 查看流水线日志. 可重复调用.
pub fn init_logger() {
    LOGGER.call_once(|| {
        let logger = CaptureLogger {
            inner: SimpleLogger::new().with_level(LevelFilter::Debug),
        };
        if log::set_logger(Box::leak(Box::new(logger))).is_ok() {
            log::set_max_level(LevelFilter::Debug);
        }
    });
}

/// 执行 `f`, 并返回其间当前线程产生的全部 `warn` 日志.
pub fn capture_warnings<T>(f: impl FnOnce() -> T) -> (T, Vec<String>) {
    init_logger();
    WARNINGS.with(|w| *w.borrow_mut() = Some(Vec::new()));
    let ans = f();
    let warnings = WARNINGS.with(|w| w.borrow_mut().take()).unwrap_or_default();
    (ans, warnings)
}
