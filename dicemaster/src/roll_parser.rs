use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::take_until,
    character::complete::{anychar, char, digit1, one_of},
    combinator::{map, map_res, recognize, value},
    multi::many0,
    sequence::{pair, terminated},
};

use crate::{error::RollError, rules::dice::RollSpec};

/// Parses bare dice notation such as `2d6+3` or `d20+1-2`.
///
/// The grammar is `[count]d<faces>` followed by any number of signed
/// adjustments. Characters after the face count that are not part of a
/// `+N`/`-N` token are ignored, so descriptive noise like `1d20+2str`
/// still parses. Check names, advantage tokens and `>threshold` suffixes are
/// split off by [`crate::query`] before this is called.
pub fn parse_dice(input: &str) -> Result<RollSpec, RollError> {
    let invalid = |what: &str| RollError::InvalidFormat(format!("{what} in {input:?}"));

    let (rest, dice_count) = dice_count(input).map_err(|_| invalid("bad dice count"))?;
    let (rest, dice_faces) = dice_faces(rest).map_err(|_| invalid("missing face count"))?;
    let (_, tokens) = adjustment_tokens(rest).map_err(|_| invalid("bad adjustment"))?;

    if dice_count == 0 || dice_faces == 0 {
        return Err(invalid("zero dice or faces"));
    }

    let mut modifier = 0i32;
    for token in &tokens {
        let value = token
            .parse::<i32>()
            .map_err(|_| invalid("adjustment out of range"))?;
        modifier = modifier
            .checked_add(value)
            .ok_or_else(|| invalid("adjustment out of range"))?;
    }

    Ok(RollSpec {
        dice_count,
        dice_faces,
        modifier,
        modifier_text: tokens.concat(),
        ..RollSpec::default()
    })
}

/// Everything before the first `d`; an empty prefix means one die.
fn dice_count(input: &str) -> IResult<&str, u32> {
    map_res(terminated(take_until("d"), char('d')), |s: &str| {
        if s.is_empty() { Ok(1) } else { s.parse::<u32>() }
    })
    .parse(input)
}

fn dice_faces(input: &str) -> IResult<&str, u32> {
    map_res(digit1, |s: &str| s.parse::<u32>()).parse(input)
}

fn adjustment_tokens(input: &str) -> IResult<&str, Vec<&str>> {
    let (input, tokens) = many0(alt((
        map(recognize(pair(one_of("+-"), digit1)), Some),
        value(None, anychar),
    )))
    .parse(input)?;
    Ok((input, tokens.into_iter().flatten().collect()))
}
