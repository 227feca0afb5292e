//! Batch parsing
//!
//! Independent inputs share nothing but the (immutable) grammar and action
//! table, so they can be parsed on any number of threads. With the
//! `parallel` feature the batch runs on rayon's pool; without it the inputs
//! are parsed one after another. Results are in input order either way.
//!
//! ```toml
//! [dependencies]
//! parr = { version = "0.1", features = ["parallel"] }
//! ```

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Run `parse` on every input
#[cfg(feature = "parallel")]
pub fn parse_batch<I, R, F>(inputs: &[I], parse: F) -> Vec<R>
where
    I: Sync,
    R: Send,
    F: Fn(&I) -> R + Sync + Send,
{
    inputs.par_iter().map(|input| parse(input)).collect()
}

/// Run `parse` on every input
#[cfg(not(feature = "parallel"))]
pub fn parse_batch<I, R, F>(inputs: &[I], parse: F) -> Vec<R>
where
    I: Sync,
    R: Send,
    F: Fn(&I) -> R + Sync + Send,
{
    inputs.iter().map(parse).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::matcher::recognize;
    use crate::engine::parser_dsl::*;

    #[test]
    fn test_results_keep_input_order() {
        let mut builder = GrammarBuilder::new();
        let digits = builder.rule("digits", class(CharClass::Digit).plus());
        let grammar = builder.build(digits).unwrap();

        let inputs: Vec<&[u8]> = vec![&b"123"[..], &b"abc"[..], &b"7"[..], &b""[..]];
        let results = parse_batch(&inputs, |input| {
            recognize(&grammar, input).map(|o| o.consumed_all)
        });
        let flags: Vec<bool> = results.into_iter().map(|r| r.unwrap()).collect();
        assert_eq!(flags, vec![true, false, true, false]);
    }
}
