//! The daily guidance deck.

use serde::Serialize;

/// One guidance card: a title, a two-line poem and its guidance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Card {
    pub title: &'static str,
    pub poem: &'static str,
    pub guidance: &'static str,
    pub image_url: &'static str,
}

pub const DECK: &[Card] = &[
    Card {
        title: "創始之光",
        poem: "混沌初開見真章，一念清靜萬法揚。",
        guidance: "現在是開啟新計畫的最佳時機，相信你的直覺，勇敢踏出第一步。",
        image_url: "https://images.unsplash.com/photo-1532968961962-8a0cb3a2d4f5?q=80&w=1000&auto=format&fit=crop",
    },
    Card {
        title: "靜謐之海",
        poem: "波瀾不驚心自閒，深海藏珍待有緣。",
        guidance: "先暫緩行動，向內探索。答案不在外面的喧囂，而在你內心的平靜裡。",
        image_url: "https://images.unsplash.com/photo-1468581264429-2548ef9eb732?q=80&w=1000&auto=format&fit=crop",
    },
    Card {
        title: "豐盛之樹",
        poem: "根深葉茂果自成，春風化雨潤無聲。",
        guidance: "你過去的努力正在發酵。保持耐心，持續灌溉，豐盛的成果即將顯化。",
        image_url: "https://images.unsplash.com/photo-1518173946687-a4c8892bbd9f?q=80&w=1000&auto=format&fit=crop",
    },
];
