use cloudscan_runner::logger::{ConsoleLogger, PLUGIN_NAME};

#[test]
fn log_prefixes_tag() {
    let (logger, captured) = ConsoleLogger::capture();
    logger.log("hello");
    assert_eq!(captured.contents(), format!("[{PLUGIN_NAME}] hello\n"));
}

#[test]
fn multi_line_message_is_tagged_per_line() {
    let (logger, captured) = ConsoleLogger::capture();
    logger.log("one\ntwo\nthree");
    assert_eq!(
        captured.lines(),
        vec![
            "[cloudscan-runner] one",
            "[cloudscan-runner] two",
            "[cloudscan-runner] three"
        ]
    );
}

#[test]
fn clones_share_the_sink() {
    let (logger, captured) = ConsoleLogger::capture();
    let other = logger.clone();
    logger.log("a");
    other.log("b");
    assert_eq!(captured.lines().len(), 2);
}

#[test]
fn concurrent_logging_never_splits_lines() {
    let (logger, captured) = ConsoleLogger::capture();
    let handles: Vec<_> = (0..4)
        .map(|t| {
            let logger = logger.clone();
            std::thread::spawn(move || {
                for i in 0..250 {
                    logger.log(&format!("thread-{t} line-{i} {}", "x".repeat(64)));
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let lines = captured.lines();
    assert_eq!(lines.len(), 1000);
    for line in &lines {
        assert!(line.starts_with("[cloudscan-runner] thread-"), "mangled line: {line}");
        assert!(line.ends_with(&"x".repeat(64)), "mangled line: {line}");
    }
}
