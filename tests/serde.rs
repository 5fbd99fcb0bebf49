#![cfg(feature = "serde")]

use segdeque::Deque;
use serde_::de::Deserialize;
use serde_test::{assert_de_tokens, assert_tokens, Token};

#[test]
fn test_serde_empty_deque() {
    let my_deque: Deque<u32> = Deque::default();
    assert_tokens(&my_deque, &[Token::Seq { len: Some(0) }, Token::SeqEnd])
}

#[test]
fn test_serde_non_empty() {
    let mut my_deque: Deque<u32> = Deque::default();
    my_deque.push_back(2);
    my_deque.push_back(3);
    my_deque.push_front(1);
    assert_tokens(
        &my_deque,
        &[
            Token::Seq { len: Some(3) },
            Token::U32(1),
            Token::U32(2),
            Token::U32(3),
            Token::SeqEnd,
        ],
    )
}

#[test]
fn test_serde_across_buckets() {
    let mut my_deque = Deque::<u32, 4>::with_bucket_size();
    for i in 9..=16 {
        my_deque.push_back(i);
    }
    for i in (1..=8).rev() {
        my_deque.push_front(i);
    }
    assert!(my_deque.bucket_count() > 3);
    assert_tokens(
        &my_deque,
        &[
            Token::Seq { len: Some(16) },
            Token::U32(1),
            Token::U32(2),
            Token::U32(3),
            Token::U32(4),
            Token::U32(5),
            Token::U32(6),
            Token::U32(7),
            Token::U32(8),
            Token::U32(9),
            Token::U32(10),
            Token::U32(11),
            Token::U32(12),
            Token::U32(13),
            Token::U32(14),
            Token::U32(15),
            Token::U32(16),
            Token::SeqEnd,
        ],
    );
}

#[test]
fn test_deserialize_unknown_length() {
    let expected: Deque<u8, 2> = vec![1, 2, 3].into();
    assert_de_tokens(
        &expected,
        &[
            Token::Seq { len: None },
            Token::U8(1),
            Token::U8(2),
            Token::U8(3),
            Token::SeqEnd,
        ],
    );
}

#[test]
fn test_deserialize_in_place() {
    let json = "[7, 8, 9]";

    let mut shorter: Deque<u32, 4> = vec![1, 2, 3, 4, 5].into();
    let geometry = (shorter.begin(), shorter.bucket_count());
    Deque::deserialize_in_place(&mut serde_json::Deserializer::from_str(json), &mut shorter)
        .unwrap();
    assert_eq!(shorter, vec![7, 8, 9]);
    assert_eq!((shorter.begin(), shorter.bucket_count()), geometry);

    let mut longer: Deque<u32, 4> = vec![1].into();
    Deque::deserialize_in_place(&mut serde_json::Deserializer::from_str(json), &mut longer)
        .unwrap();
    assert_eq!(longer, vec![7, 8, 9]);
}

#[test]
fn test_vec_to_deque_serde() {
    let plain: Vec<u32> = vec![1, 2, 3, 4];
    let json = serde_json::to_string(&plain).unwrap();
    let deque: Deque<u32> = serde_json::from_str(&json).unwrap();
    assert_eq!(
        plain, deque,
        "Deserialized Deque is not identical to the original Vec"
    );
}

#[test]
fn test_deque_to_vec_serde() {
    let mut deque: Deque<u32> = Deque::new();
    deque.push_back(3);
    deque.push_back(4);
    deque.push_front(2);
    deque.push_front(1);
    let json = serde_json::to_string(&deque).unwrap();
    let plain: Vec<u32> = serde_json::from_str(&json).unwrap();
    assert_eq!(
        deque, plain,
        "Deserialized Vec is not identical to the original Deque"
    );
}
