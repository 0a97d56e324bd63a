//! Debounced Search Demo
//!
//! Simulates a search box component that re-renders on every keystroke and
//! only issues a search once typing pauses:
//! - The debounced handle is created once and survives every re-render
//! - Each keystroke re-renders with a new query, refreshing the callback
//! - Unmounting flushes whatever search is still pending
//!
//! Run with: RUST_LOG=debug cargo run -p tether_hooks --example search_box

use anyhow::Result;
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;
use tether_hooks::{Component, Debounced, HookScope, HooksConfig, Timers};
use tracing_subscriber::EnvFilter;

/// Props of the search box: the text typed so far
#[derive(Debug, Clone)]
struct SearchProps {
    query: String,
}

const CONFIG: &str = r#"
[debounce]
wait_ms = 300
"#;

fn search_box(
    scope: &mut HookScope,
    props: &SearchProps,
    log: Rc<RefCell<Vec<String>>>,
) -> Debounced<()> {
    let query = props.query.clone();
    scope.use_debounce(
        "search",
        move |()| {
            tracing::info!(%query, "searching");
            log.borrow_mut().push(query.clone());
        },
        None,
    )
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = HooksConfig::from_toml_str(CONFIG)?;
    let timers = Timers::new();
    let searches = Rc::new(RefCell::new(Vec::new()));

    let log = searches.clone();
    let mut component = Component::mount_with_config(
        &timers,
        config,
        SearchProps {
            query: String::new(),
        },
        move |scope, props| search_box(scope, props, log.clone()),
    );

    // Fast typing: one keystroke every 80ms, then a pause
    for word in ["r", "ru", "rus", "rust"] {
        component.rerender(SearchProps {
            query: word.to_string(),
        });
        component.result().call(());
        timers.sleep(Duration::from_millis(80)).await;
    }
    timers.sleep(Duration::from_millis(400)).await;

    // Start another query and leave before the pause ends
    component.rerender(SearchProps {
        query: "rust hooks".to_string(),
    });
    component.result().call(());
    let renders = component.renders();
    let pending = component.unmount();
    pending.flush();

    tracing::info!(searches = ?searches.borrow(), renders, "done");
    Ok(())
}
