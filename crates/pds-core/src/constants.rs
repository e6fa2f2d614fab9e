/// Letter values indexed by `letter - b'A'`; cycles 1..=9 through the alphabet.
pub const LETTER_VALUES: [u8; 26] = [
    1, 2, 3, 4, 5, 6, 7, 8, 9, // A-I
    1, 2, 3, 4, 5, 6, 7, 8, 9, // J-R
    1, 2, 3, 4, 5, 6, 7, 8, // S-Z
];

/// Letters counted toward the soul number; everything else is persona.
pub const VOWELS: [char; 5] = ['A', 'E', 'I', 'O', 'U'];

/// Temperament buckets keyed by letter value.
pub const BODY_VALUES: [u8; 2] = [4, 5];
pub const MIND_VALUES: [u8; 2] = [1, 8];
pub const EMOTION_VALUES: [u8; 3] = [2, 3, 6];
pub const INTUITION_VALUES: [u8; 2] = [7, 9];

/// Numbers preserved by `reduce_with(.., true)`.
pub const MASTER_NUMBERS: [u64; 3] = [11, 22, 33];

/// Diamond chart: the first stage ends at `STAGE_BASE_AGE - life_path`.
pub const STAGE_BASE_AGE: u32 = 36;

/// Diamond chart: length in years of the second and third stages.
pub const STAGE_SPAN: u32 = 9;

/// Earliest accepted birth year.
pub const MIN_BIRTH_YEAR: u16 = 1900;

/// Radar weight of a member's O digit; every other parameter weighs 1.
pub const CORE_WEIGHT: u32 = 3;
