//! # ファイル名用ランダム識別子
//!
//! 名前指定のないアップロードに付与するパス断片を生成する。
//! 暗号学的強度は不要。スレッドローカルPRNGを使うためブロックしない。

use rand::Rng;

/// 識別子に使う文字（小文字英数字、base36）。
const ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// 1ユニットあたりの文字数。
pub const UNIT_LEN: usize = 13;

/// 既定のユニット数。
pub const DEFAULT_UNITS: usize = 1;

/// `units` ユニット分（`UNIT_LEN * units` 文字）のランダム識別子を生成する。
/// `units` が0の場合は1ユニットとして扱う。
pub fn new_identifier(units: usize) -> String {
    let len = UNIT_LEN * units.max(1);
    let mut rng = rand::thread_rng();
    let mut buf = String::with_capacity(len);
    for _ in 0..len {
        let idx = rng.gen_range(0..ALPHABET.len());
        buf.push(ALPHABET[idx] as char);
    }
    buf
}
