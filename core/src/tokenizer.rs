use crate::config::{AnalyzerConfig, Language};
use lazy_static::lazy_static;
use regex::Regex;
use rust_stemmers::Stemmer;
use unicode_normalization::UnicodeNormalization;
use std::collections::HashSet;

lazy_static! {
    static ref RE: Regex = Regex::new(r"(?u)\p{L}[\p{L}\p{N}_']*|\p{N}[\p{L}\p{N}_]*").expect("valid regex");
    static ref DEFAULT_ANALYZER: Analyzer = Analyzer::new(AnalyzerConfig::default());
    static ref STOPWORDS: HashSet<&'static str> = {
        let words: &[&str] = &[
            "a","about","above","after","again","against","all","am","an","and","any","are","aren't","as","at",
            "be","because","been","before","being","below","between","both","but","by",
            "can","can't","cannot","could","couldn't",
            "did","didn't","do","does","doesn't","doing","don't","down","during",
            "each","few","for","from","further",
            "had","hadn't","has","hasn't","have","haven't","having","he","he'd","he'll","he's","her","here","here's","hers","herself","him","himself","his","how","how's",
            "i","i'd","i'll","i'm","i've","if","in","into","is","isn't","it","it's","its","itself",
            "let's","me","more","most","mustn't","my","myself",
            "no","nor","not","of","off","on","once","only","or","other","ought","our","ours","ourselves","out","over","own",
            "same","she","she'd","she'll","she's","should","shouldn't","so","some","such",
            "than","that","that's","the","their","theirs","them","themselves","then","there","there's","these","they","they'd","they'll","they're","they've","this","those","through","to","too",
            "under","until","up","very",
            "was","wasn't","we","we'd","we'll","we're","we've","were","weren't","what","what's","when","when's","where","where's","which","while","who","who's","whom","why","why's","with","won't","would","wouldn't",
            "you","you'd","you'll","you're","you've","your","yours","yourself","yourselves"
        ];
        words.iter().copied().collect()
    };
}

/// Normalizes text into index terms: NFKC, lowercase, word split, stopwords, stemming.
pub struct Analyzer {
    config: AnalyzerConfig,
    stemmer: Option<Stemmer>,
}

impl Analyzer {
    pub fn new(config: AnalyzerConfig) -> Self {
        let stemmer = config.stem.then(|| Stemmer::create(config.language.algorithm()));
        Self { config, stemmer }
    }

    pub fn config(&self) -> AnalyzerConfig { self.config }

    /// Normalize `text` once; terms are produced lazily by [`Tokens::iter`].
    pub fn analyze(&self, text: &str) -> Tokens<'_> {
        let buffer = text.nfkc().collect::<String>().to_lowercase();
        Tokens { analyzer: self, buffer }
    }

    fn term(&self, token: &str) -> Option<String> {
        if self.config.stopwords && self.config.language == Language::English && STOPWORDS.contains(token) {
            return None;
        }
        match &self.stemmer {
            Some(stemmer) => Some(stemmer.stem(token).into_owned()),
            None => Some(token.to_string()),
        }
    }
}

impl Default for Analyzer {
    fn default() -> Self { Self::new(AnalyzerConfig::default()) }
}

/// Normalized text owned once; yields `(term, position)` pairs on demand.
/// Positions count every word, including dropped stopwords.
pub struct Tokens<'a> {
    analyzer: &'a Analyzer,
    buffer: String,
}

impl Tokens<'_> {
    pub fn iter<'s>(&'s self) -> impl Iterator<Item = (String, usize)> + 's {
        self.words().filter_map(|(pos, term)| term.map(|t| (t, pos)))
    }

    /// Every word with its position; stopwords yield `None` but still take a slot.
    pub fn words<'s>(&'s self) -> impl Iterator<Item = (usize, Option<String>)> + 's {
        let analyzer: &'s Analyzer = self.analyzer;
        RE.find_iter(&self.buffer)
            .enumerate()
            .map(move |(pos, mat)| (pos, analyzer.term(mat.as_str())))
    }
}

/// Tokenize text into (term, position) with the default English pipeline.
pub fn tokenize(text: &str) -> Vec<(String, usize)> {
    DEFAULT_ANALYZER.analyze(text).iter().collect()
}
