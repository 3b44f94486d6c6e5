// SPDX-License-Identifier: Apache-2.0

// Refusing every single allocation request in turn must never leak.

use picotree::{
    free, parse_in, AllocError, Allocator, ChunkReader, MemoryLimit, ParseError, UnicodePolicy,
};
use test_log::test;

/// Counts live bytes and refuses the `fail_at`-th allocating request.
struct FailingAllocator {
    fail_at: Option<usize>,
    requests: usize,
    live: usize,
}

impl FailingAllocator {
    fn new(fail_at: Option<usize>) -> Self {
        Self {
            fail_at,
            requests: 0,
            live: 0,
        }
    }
}

impl Allocator for FailingAllocator {
    fn resize(&mut self, old: usize, new: usize) -> Result<(), AllocError> {
        if new != 0 {
            let index = self.requests;
            self.requests += 1;
            if self.fail_at == Some(index) {
                return Err(AllocError);
            }
        }
        assert!(old <= self.live, "released {} of {} live bytes", old, self.live);
        self.live = self.live - old + new;
        Ok(())
    }
}

const DOCUMENTS: &[&str] = &[
    r#""just a string that needs to grow a few times""#,
    r#"[1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16, 17]"#,
    r#"{"name": "demo", "tags": ["a", "b", "c"], "nested": {"deep": [[], {}, [null]]}}"#,
    r#"[{"k": 1.5e3}, {"k": -0.25}, {"\u00e9": "\uD800x"}]"#,
    r#"{"": "", "a": {"b": {"c": {"d": ["long enough to reallocate once or twice"]}}}}"#,
];

fn run_with_failure_at(
    json: &str,
    fail_at: Option<usize>,
) -> (Result<picotree::Value, ParseError>, FailingAllocator) {
    let mut allocator = FailingAllocator::new(fail_at);
    let result = parse_in(&mut allocator, ChunkReader::new(json.as_bytes(), 7));
    (result, allocator)
}

#[test]
fn test_every_failure_point_releases_everything() {
    for json in DOCUMENTS {
        let (result, baseline) = run_with_failure_at(json, None);
        let value = result.unwrap();
        let total_requests = baseline.requests;
        assert!(total_requests > 0);

        for fail_at in 0..total_requests {
            let (result, allocator) = run_with_failure_at(json, Some(fail_at));
            assert_eq!(
                result,
                Err(ParseError::OutOfMemory),
                "request {} of {} in {}",
                fail_at,
                total_requests,
                json
            );
            assert_eq!(allocator.live, 0, "leak after failing request {fail_at} in {json}");
        }

        let mut baseline = baseline;
        free(&mut baseline, value);
        assert_eq!(baseline.live, 0);
    }
}

#[test]
fn test_syntax_error_releases_everything() {
    let broken = [
        r#"{"a": ["x", "y", {"z": [1, 2, 3, "#,
        r#"[{"k": "v"}, {"k": tru}]"#,
        r#"{"key": "value", "other": [1, 2]] "#,
        r#"[["deep", ["deeper", "\q"]]]"#,
    ];
    for json in broken {
        let (result, allocator) = run_with_failure_at(json, None);
        assert!(matches!(result, Err(ParseError::Syntax(_))), "{json}");
        assert!(allocator.requests > 0);
        assert_eq!(allocator.live, 0, "leak in {json}");
    }
}

#[test]
fn test_reject_policy_error_releases_everything() {
    let json = br#"{"ok": ["fine", "also fine"], "bad": "\uDC00"}"#;
    let mut window = [0u8; 16];
    let mut limit = MemoryLimit::new(usize::MAX);
    let result = picotree::TreeParser::with_allocator(
        ChunkReader::full_slice(json),
        &mut window,
        &mut limit,
    )
    .with_options(picotree::ParseOptions {
        unicode: UnicodePolicy::Reject,
        ..Default::default()
    })
    .parse();
    assert!(result.is_err());
    assert!(limit.peak() > 0);
    assert_eq!(limit.in_use(), 0);
}

#[test]
fn test_memory_limit_bounds_untrusted_input() {
    let mut big = String::from("[");
    for i in 0..1000 {
        if i > 0 {
            big.push(',');
        }
        big.push_str(r#""some padding text""#);
    }
    big.push(']');

    let mut limit = MemoryLimit::new(4096);
    let result = parse_in(&mut limit, ChunkReader::full_slice(big.as_bytes()));
    assert_eq!(result, Err(ParseError::OutOfMemory));
    assert!(limit.peak() <= 4096);
    assert_eq!(limit.in_use(), 0);
}

#[test]
fn test_memory_limit_sized_to_fit() {
    let json = br#"{"a": [1, 2, 3], "b": "text"}"#;
    let mut generous = MemoryLimit::new(usize::MAX);
    let value = parse_in(&mut generous, ChunkReader::full_slice(json)).unwrap();
    let peak = generous.peak();
    free(&mut generous, value);

    let mut exact = MemoryLimit::new(peak);
    assert!(parse_in(&mut exact, ChunkReader::full_slice(json)).is_ok());

    let mut short = MemoryLimit::new(peak - 1);
    assert_eq!(
        parse_in(&mut short, ChunkReader::full_slice(json)),
        Err(ParseError::OutOfMemory)
    );
    assert_eq!(short.in_use(), 0);
}
