use chrono::Utc;
use rand::Rng;

/// Characters used for the random suffix of a game id
const GAME_ID_SUFFIX_CHARS: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
const GAME_ID_SUFFIX_LENGTH: usize = 9;
const GAME_ID_PREFIX: &str = "game_";

/// Generate a game id of the form `game_<unix-millis>_<random suffix>`.
pub fn generate_game_id() -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..GAME_ID_SUFFIX_LENGTH)
        .map(|_| {
            let idx = rng.gen_range(0..GAME_ID_SUFFIX_CHARS.len());
            char::from(GAME_ID_SUFFIX_CHARS[idx])
        })
        .collect();
    format!("{GAME_ID_PREFIX}{}_{suffix}", Utc::now().timestamp_millis())
}

/// Validate game id format
pub fn is_valid_game_id(id: &str) -> bool {
    let Some(rest) = id.strip_prefix(GAME_ID_PREFIX) else {
        return false;
    };
    let Some((millis, suffix)) = rest.split_once('_') else {
        return false;
    };
    !millis.is_empty()
        && millis.chars().all(|c| c.is_ascii_digit())
        && suffix.len() == GAME_ID_SUFFIX_LENGTH
        && suffix.bytes().all(|b| GAME_ID_SUFFIX_CHARS.contains(&b))
}
