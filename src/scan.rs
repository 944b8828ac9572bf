use crate::{
    error::ScanError,
    token::{self, Token},
    Position,
};

/// Scanner cuts tokens out of the source text. It keeps two byte offsets,
/// `start` marking the lexeme being scanned and `current` sitting just past
/// the characters consumed so far; a token's text is the slice between them.
/// One token is produced per call, so the stream is as lazy as the parser's
/// lookahead.
#[derive(Debug)]
pub struct Scanner<'src> {
    src: &'src str,
    start: usize,
    current: usize,
    pos: Position,
}

impl<'src> Scanner<'src> {
    /// Create a new scanner
    pub fn new(src: &'src str) -> Self {
        Self {
            src,
            start: 0,
            current: 0,
            pos: Position::default(),
        }
    }

    /// Cut the next token out of the source, or `None` at the end of input.
    pub fn next_token(&mut self) -> Result<Option<Token>, ScanError> {
        self.skip_blanks();
        self.start = self.current;
        let token_pos = self.pos;
        let Some(c) = self.bump() else {
            return Ok(None);
        };

        let typ = match c {
            '(' => token::Type::LParen,
            ')' => token::Type::RParen,
            '{' => token::Type::LBrace,
            '}' => token::Type::RBrace,
            ';' => token::Type::Semicolon,
            ',' => token::Type::Comma,
            '.' => token::Type::Dot,
            '-' => token::Type::Minus,
            '+' => token::Type::Plus,
            '/' => token::Type::Slash,
            '*' => token::Type::Star,
            '!' => self.either('=', token::Type::BangEqual, token::Type::Bang),
            '=' => self.either('=', token::Type::EqualEqual, token::Type::Equal),
            '<' => self.either('=', token::Type::LessEqual, token::Type::Less),
            '>' => self.either('=', token::Type::GreaterEqual, token::Type::Greater),
            '"' => return self.string_literal(token_pos).map(Some),
            '0'..='9' => self.number_literal(),
            c if is_ident_start(c) => self.identifier(),
            c => return Err(ScanError::UnexpectedCharacter(token_pos, c)),
        };
        Ok(Some(self.cut(typ, token_pos)))
    }

    fn identifier(&mut self) -> token::Type {
        while self.first().map_or(false, is_ident_part) {
            self.bump();
        }
        keyword_or_ident(&self.src[self.start..self.current])
    }

    fn number_literal(&mut self) -> token::Type {
        while self.first().map_or(false, |c| c.is_ascii_digit()) {
            self.bump();
        }
        // A trailing dot is not part of the number; it only joins when a
        // fractional digit follows.
        if self.first() == Some('.') && self.second().map_or(false, |c| c.is_ascii_digit()) {
            self.bump();
            while self.first().map_or(false, |c| c.is_ascii_digit()) {
                self.bump();
            }
        }
        token::Type::Number
    }

    // Strings may span lines and have no escape sequences. An unterminated
    // one is reported at its opening quote.
    fn string_literal(&mut self, token_pos: Position) -> Result<Token, ScanError> {
        loop {
            match self.bump() {
                Some('"') => return Ok(self.cut(token::Type::String, token_pos)),
                Some(_) => {}
                None => return Err(ScanError::UnterminatedString(token_pos)),
            }
        }
    }

    fn skip_blanks(&mut self) {
        loop {
            match self.first() {
                Some(' ' | '\r' | '\t' | '\n') => {
                    self.bump();
                }
                Some('/') if self.second() == Some('/') => {
                    while self.first().map_or(false, |c| c != '\n') {
                        self.bump();
                    }
                }
                _ => return,
            }
        }
    }

    // Two-character operators share a first character with a one-character
    // operator; pick by the character that follows.
    fn either(&mut self, follow: char, matched: token::Type, alone: token::Type) -> token::Type {
        if self.first() == Some(follow) {
            self.bump();
            matched
        } else {
            alone
        }
    }

    fn first(&self) -> Option<char> {
        self.src[self.current..].chars().next()
    }

    fn second(&self) -> Option<char> {
        self.src[self.current..].chars().nth(1)
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.first()?;
        self.current += c.len_utf8();
        if c == '\n' {
            self.pos.next_line();
        } else {
            self.pos.next_column();
        }
        Some(c)
    }

    fn cut(&self, typ: token::Type, pos: Position) -> Token {
        Token {
            typ,
            lexeme: self.src[self.start..self.current].to_string(),
            pos,
        }
    }
}

impl Iterator for Scanner<'_> {
    type Item = Result<Token, ScanError>;
    fn next(&mut self) -> Option<Self::Item> {
        self.next_token().transpose()
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_ident_part(c: char) -> bool {
    is_ident_start(c) || c.is_ascii_digit()
}

// Keyword recognition dispatches on the leading letter, then on the second
// where two keywords share it, and compares the remaining tail in one shot.
// Anything that falls through is a plain identifier.
fn keyword_or_ident(word: &str) -> token::Type {
    let rest = |from: usize, tail: &str, typ: token::Type| {
        if &word[from..] == tail {
            typ
        } else {
            token::Type::Ident
        }
    };
    match word.as_bytes()[0] {
        b'a' => rest(1, "nd", token::Type::And),
        b'c' => rest(1, "lass", token::Type::Class),
        b'e' => rest(1, "lse", token::Type::Else),
        b'f' => match word.as_bytes().get(1) {
            Some(b'a') => rest(2, "lse", token::Type::False),
            Some(b'o') => rest(2, "r", token::Type::For),
            Some(b'u') => rest(2, "n", token::Type::Fun),
            _ => token::Type::Ident,
        },
        b'i' => rest(1, "f", token::Type::If),
        b'n' => rest(1, "il", token::Type::Nil),
        b'o' => rest(1, "r", token::Type::Or),
        b'p' => rest(1, "rint", token::Type::Print),
        b'r' => rest(1, "eturn", token::Type::Return),
        b's' => rest(1, "uper", token::Type::Super),
        b't' => match word.as_bytes().get(1) {
            Some(b'h') => rest(2, "is", token::Type::This),
            Some(b'r') => rest(2, "ue", token::Type::True),
            _ => token::Type::Ident,
        },
        b'v' => rest(1, "ar", token::Type::Var),
        b'w' => rest(1, "hile", token::Type::While),
        _ => token::Type::Ident,
    }
}
