// SPDX-License-Identifier: Apache-2.0

// Depth limit: every value counts one level, so 1023 nested arrays are the
// deepest accepted document under the default limit.

use picotree::{
    from_slice, parse_in, parse_with_options, ChunkReader, MemoryLimit, ParseError, ParseOptions,
    Value, MAX_DEPTH,
};

fn nested_arrays(depth: usize) -> Vec<u8> {
    let mut json = vec![b'['; depth];
    json.extend(std::iter::repeat(b']').take(depth));
    json
}

/// Runaway and repeated deep cases get a roomy stack. Documents at the
/// default limit run on the regular test thread.
fn with_big_stack<T: Send + 'static>(f: impl FnOnce() -> T + Send + 'static) -> T {
    std::thread::Builder::new()
        .stack_size(64 * 1024 * 1024)
        .spawn(f)
        .unwrap()
        .join()
        .unwrap()
}

fn depth_of(value: &Value) -> usize {
    let mut depth = 1;
    let mut current = value;
    while let Some([inner]) = current.as_array() {
        depth += 1;
        current = inner;
    }
    depth
}

#[test]
fn test_deepest_accepted_document() {
    let value = from_slice(&nested_arrays(MAX_DEPTH - 1)).unwrap();
    assert_eq!(depth_of(&value), MAX_DEPTH - 1);
}

#[test]
fn test_one_level_too_deep() {
    assert_eq!(
        from_slice(&nested_arrays(MAX_DEPTH)),
        Err(ParseError::TooMuchNesting)
    );
}

#[test]
fn test_scalar_at_the_limit_counts() {
    with_big_stack(|| {
        // 1022 arrays around a number is 1023 levels
        let mut json = vec![b'['; MAX_DEPTH - 2];
        json.push(b'1');
        json.extend(std::iter::repeat(b']').take(MAX_DEPTH - 2));
        assert!(from_slice(&json).is_ok());

        let mut json = vec![b'['; MAX_DEPTH - 1];
        json.push(b'1');
        json.extend(std::iter::repeat(b']').take(MAX_DEPTH - 1));
        assert_eq!(from_slice(&json), Err(ParseError::TooMuchNesting));
    });
}

#[test]
fn test_unterminated_deep_document_hits_limit_first() {
    with_big_stack(|| {
        let json = vec![b'['; 100_000];
        assert_eq!(from_slice(&json), Err(ParseError::TooMuchNesting));
    });
}

#[test]
fn test_objects_count_like_arrays() {
    with_big_stack(|| {
        let depth = MAX_DEPTH - 1;
        let mut json = Vec::new();
        for _ in 0..depth - 1 {
            json.extend_from_slice(br#"{"k":"#);
        }
        json.extend_from_slice(b"{}");
        json.extend(std::iter::repeat(b'}').take(depth - 1));
        assert!(from_slice(&json).is_ok());
    });
}

#[test]
fn test_custom_limit() {
    let options = ParseOptions {
        max_depth: 3,
        ..Default::default()
    };
    let parse = |json: &[u8]| parse_with_options(ChunkReader::full_slice(json), options);
    assert!(parse(b"[[]]").is_ok());
    assert!(parse(b"[1, [], {}]").is_ok());
    assert_eq!(parse(b"[[[]]]"), Err(ParseError::TooMuchNesting));
    assert_eq!(parse(b"[[1]]"), Err(ParseError::TooMuchNesting));
}

#[test]
fn test_nesting_failure_releases_everything() {
    with_big_stack(|| {
        let mut json = Vec::new();
        for _ in 0..MAX_DEPTH {
            json.extend_from_slice(br#"["pad", "#);
        }
        let mut limit = MemoryLimit::new(usize::MAX);
        let result = parse_in(&mut limit, ChunkReader::full_slice(&json));
        assert_eq!(result, Err(ParseError::TooMuchNesting));
        assert!(limit.peak() > 0);
        assert_eq!(limit.in_use(), 0);
    });
}
