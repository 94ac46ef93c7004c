//! Roblox 검증 문구 생성기
//!
//! 동물 이름 N개(배포 단위로 5 또는 8)를 공백으로 이어 붙인 문구를 만듭니다.
//! 사용자가 Roblox 프로필 소개글에 직접 입력하므로, 단어는 모두 소문자 한 단어입니다.

use std::collections::HashSet;
use once_cell::sync::Lazy;
use rand::seq::IndexedRandom;
use crate::config::ChallengeLength;

pub static WORDS: &[&str] = &[
    "aardvark", "albatross", "alligator", "alpaca", "ant", "anteater", "antelope", "ape",
    "armadillo", "donkey", "badger", "barracuda", "bat", "bear", "beaver", "bee", "bison",
    "boar", "buffalo", "butterfly", "camel", "capybara", "caribou", "cassowary", "cat",
    "caterpillar", "chamois", "cheetah", "chicken", "chimpanzee", "chinchilla", "clam",
    "cobra", "cockroach", "coyote", "crab", "crane", "crocodile", "crow", "curlew", "deer",
    "dog", "dolphin", "dove", "dragonfly", "duck", "eagle", "eel", "elephant", "elk", "emu",
    "falcon", "ferret", "finch", "fish", "flamingo", "fly", "fox", "frog", "gazelle",
    "gerbil", "giraffe", "goat", "goldfish", "goose", "gorilla", "grasshopper", "grouse",
    "guanaco", "gull", "hamster", "hare", "hawk", "hedgehog", "heron", "herring",
    "hippopotamus", "hornet", "horse", "hummingbird", "jackal", "jaguar", "jay",
    "jellyfish", "kangaroo", "kingfisher", "koala", "lemur", "leopard", "lion", "llama",
    "lobster", "magpie", "mallard", "manatee", "mandrill", "mantis", "marten", "meerkat",
    "mink", "mole", "mongoose", "monkey", "moose", "mosquito", "mouse", "mule", "narwhal",
    "newt", "nightingale", "octopus", "okapi", "oryx", "ostrich", "otter", "owl", "oyster",
    "panther", "parrot", "partridge", "peafowl", "pelican", "penguin", "pheasant", "pig",
    "pigeon", "pony", "porcupine", "quail", "rabbit", "raccoon", "ram", "rat", "raven",
    "reindeer", "rhinoceros", "rook", "salamander", "salmon", "sandpiper", "scorpion",
    "seahorse", "seal", "shark", "sheep", "shrew", "snake", "sparrow", "spider", "squid",
    "squirrel", "starling", "stingray", "stork", "swan", "tiger", "toad", "trout", "turkey",
    "turtle", "viper", "vulture", "wallaby", "walrus", "wasp", "weasel", "whale", "wildcat",
    "wolf", "wolverine", "wombat", "woodpecker", "worm", "wren", "yak", "zebra",
];

static WORD_SET: Lazy<HashSet<&'static str>> = Lazy::new(|| WORDS.iter().copied().collect());

/// 검증 문구 공급자
pub trait PhraseSource: Send + Sync {
    fn phrase(&self, length: ChallengeLength) -> String;
}

/// 스레드 로컬 난수 생성기를 사용하는 기본 구현
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomPhrase;

impl PhraseSource for RandomPhrase {
    fn phrase(&self, length: ChallengeLength) -> String {
        let mut rng = rand::rng();
        (0..length.words())
            .filter_map(|_| WORDS.choose(&mut rng).copied())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// 사용자가 보낸 문구가 생성기가 만들 수 있는 형태인지 확인합니다.
///
/// 저장소 조회 전에 명백히 잘못된 입력을 걸러내는 용도이며, 단어 수는 5 또는 8만 허용합니다.
pub fn is_well_formed(code: &str) -> bool {
    let words: Vec<&str> = code.split(' ').collect();
    ChallengeLength::from_words(words.len()).is_some() && words.iter().all(|w| WORD_SET.contains(w))
}
