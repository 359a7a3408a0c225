//! The built-in curated table.
//!
//! Order matters: the reconciler picks the first curated label that matches.

pub(super) const CURATED: &[(&str, &str, &str)] = &[
    (
        "excited",
        "2 Timothy 1:7 - For God did not give us a spirit of fear, but of power and of love and of a sound mind.",
        "Let that energy carry you forward. God has given you power and a sound mind for what lies ahead.",
    ),
    (
        "satisfied",
        "Colossians 3:23 - And whatever you do, do it heartily, as for the Lord rather than for men.",
        "Contentment is a gift. Keep offering your work to the Lord and rest in what He has provided.",
    ),
    (
        "joyful",
        "Philippians 4:4 - Rejoice in the Lord always. I will say it again: Rejoice!",
        "Your joy is worth celebrating. Let it overflow into thanksgiving.",
    ),
    (
        "proud",
        "Ephesians 2:10 - For we are His workmanship, created in Christ Jesus for good works, which God prepared beforehand that we should walk in them.",
        "You were made for good works. Give thanks for what you accomplished and keep walking in them.",
    ),
    (
        "frustrated",
        "Romans 8:28 - And we know that in all things God works for the good of those who love him, who have been called according to his purpose.",
        "This setback is not the end of the story. God is working even in what frustrates you.",
    ),
    (
        "overwhelmed",
        "Matthew 11:28 - Come to me, all you who are weary and burdened, and I will give you rest.",
        "You do not have to carry everything at once. Bring the weight to Him and take the rest He offers.",
    ),
    (
        "bored",
        "Colossians 3:23 - And whatever you do, do it heartily, as for the Lord rather than for men.",
        "Even ordinary moments can be offered to God. Look for one small thing to do wholeheartedly today.",
    ),
];

/// Shown when nothing better is available.
pub const DEFAULT_ENCOURAGEMENT: &str = "Even though I might not fully understand your current emotion, remember that God is always with you.";

/// Used when no verse can be recovered from model output.
pub const DEFAULT_VERSE: &str =
    "Proverbs 3:5 - Trust in the Lord with all your heart and lean not on your own understanding.";
