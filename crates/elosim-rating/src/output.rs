use crate::Ratings;

/// Parses engine output into ratings.
///
/// Each line holding exactly two whitespace-separated tokens, the second of which
/// is an integer, becomes one record. Everything else is skipped. Later records for
/// the same name replace earlier ones.
///
/// ```
/// use elosim_rating::output::parse_engine_output;
///
/// let ratings = parse_engine_output("Player-1 1532\ngarbage line with 4 tokens\n");
/// assert_eq!(ratings.len(), 1);
/// assert_eq!(ratings["Player-1"], 1532);
/// ```
#[must_use]
pub fn parse_engine_output(output: &str) -> Ratings {
    output.lines().filter_map(parse_record).collect()
}

fn parse_record(line: &str) -> Option<(String, i64)> {
    let mut tokens = line.split_whitespace();
    let (Some(name), Some(elo), None) = (tokens.next(), tokens.next(), tokens.next()) else {
        return None;
    };
    let elo = elo.parse().ok()?;
    Some((name.to_owned(), elo))
}
