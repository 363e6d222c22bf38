use logos::Logos;

/// Tokens for job files
///
/// One `key value` statement per line; `#` starts a comment.
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\f\r]+")]
pub enum Token {
    // Keys
    #[token("machine")]
    Machine,

    #[token("spindle")]
    Spindle,

    #[token("tool")]
    Tool,

    #[token("material")]
    Material,

    #[token("cut")]
    Cut,

    #[token("aggressiveness")]
    #[token("aggr")]
    Aggressiveness,

    #[token("doc")]
    Doc,

    #[token("woc")]
    Woc,

    #[token("flutes")]
    Flutes,

    #[token("stickout")]
    Stickout,

    #[token("hobby")]
    Hobby,

    // Switches
    #[token("on")]
    #[token("yes")]
    On,

    #[token("off")]
    #[token("no")]
    Off,

    // Literals
    #[regex(r"-?\d+(\.\d+)?", |lex| lex.slice().parse::<f64>().ok(), priority = 10)]
    Number(f64),

    #[regex(r#""[^"\n]*""#, |lex| lex.slice()[1..lex.slice().len() - 1].to_string())]
    String(String),

    /// Catalog ids and cut types: `em-6-3fl`, `vfd-1.5kw`, `adaptive`
    #[regex(r"[A-Za-z0-9_][A-Za-z0-9_.\-]*", |lex| lex.slice().to_string(), priority = 1)]
    Identifier(String),

    #[token("=")]
    Equals,

    #[token("\n")]
    Newline,

    #[regex(r"#[^\n]*", logos::skip)]
    Comment,
}

impl Token {
    /// Name shown in error messages
    pub fn describe(&self) -> String {
        match self {
            Token::Number(n) => format!("number {}", n),
            Token::String(s) => format!("string \"{}\"", s),
            Token::Identifier(s) => format!("'{}'", s),
            Token::Equals => "'='".to_string(),
            Token::Newline => "end of line".to_string(),
            other => format!("keyword '{}'", format!("{:?}", other).to_lowercase()),
        }
    }
}

/// Lex a job file. Fails on the first byte range no token matches.
pub fn lex(input: &str) -> Result<Vec<(Token, logos::Span)>, logos::Span> {
    Token::lexer(input)
        .spanned()
        .map(|(result, span)| match result {
            Ok(token) => Ok((token, span)),
            Err(()) => Err(span),
        })
        .collect()
}
