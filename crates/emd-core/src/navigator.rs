//! Quick-reply menus.
//!
//! One root category and a flat set of leaves. Every leaf ends with the
//! "Буцах" entry, which returns to the root instead of sending a message.

use serde::{Deserialize, Serialize};

/// Sentinel quick-reply text that navigates back to [`Category::Main`].
pub const BACK: &str = "Буцах";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Main,
    Medicine,
    Payment,
    Hospitals,
    Services,
}

impl Category {
    pub fn all() -> [Category; 5] {
        [
            Category::Main,
            Category::Medicine,
            Category::Payment,
            Category::Hospitals,
            Category::Services,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Main => "main",
            Category::Medicine => "medicine",
            Category::Payment => "payment",
            Category::Hospitals => "hospitals",
            Category::Services => "services",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Category::Main => "Түгээмэл асуултууд",
            Category::Medicine => "Хөнгөлөлттэй эм",
            Category::Payment => "Шимтгэл, төлбөр",
            Category::Hospitals => "Гэрээт эмнэлэг",
            Category::Services => "Үйлчилгээ",
        }
    }

    /// Questions offered while this category is active.
    pub fn questions(&self) -> Vec<QuickQuestion> {
        use Category::*;
        let entries: &[(&str, Option<Category>)] = match self {
            Main => &[
                ("ЭМД төлбөрөө хаанаас төлөх вэ?", Some(Payment)),
                ("Ямар эмнэлгүүд ЭМД-тэй гэрээтэй вэ?", Some(Hospitals)),
                ("ЭМД-ийн хураамж хэд вэ?", Some(Payment)),
                ("ЭМД-аар ямар үйлчилгээ авж болох вэ?", Some(Services)),
                ("ЭМД-ын хөнгөлөлттэй эмийн жагсаалт", Some(Medicine)),
            ],
            Medicine => &[
                ("Ханиад томууны үед ямар эм хөнгөлөлттэй вэ?", None),
                ("Парацетамол хөнгөлөлттэй юу?", None),
                ("Өвчний үед хөнгөлөлттэй эмийг яаж авах вэ?", None),
                (BACK, None),
            ],
            Payment => &[
                ("ЭМД шимтгэлийн дутуу саруудаа хэрхэн шалгах вэ?", None),
                ("ЭМД заавал төлөх ёстой юу?", None),
                ("Шимтгэлийн хэмжээ хэд вэ?", None),
                (BACK, None),
            ],
            Hospitals => &[
                ("Гэрээт эмнэлгүүдийн жагсаалт", None),
                ("Ходоодны өвчнөөр хаана үзүүлэх вэ?", None),
                ("Битүүмж гэж юу вэ?", None),
                (BACK, None),
            ],
            Services => &[
                ("Ямар тусламж үйлчилгээ авах боломжтой вэ?", None),
                ("ЭМД-ын дэвтэргүй үйлчлүүлж болох уу?", None),
                (BACK, None),
            ],
        };

        entries
            .iter()
            .enumerate()
            .map(|(i, (text, category))| QuickQuestion {
                id: i as u32 + 1,
                text: (*text).to_string(),
                category: *category,
            })
            .collect()
    }
}

/// A predefined question shortcut.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuickQuestion {
    pub id: u32,
    pub text: String,
    /// Menu to show once the answer has had time to render.
    pub category: Option<Category>,
}

impl QuickQuestion {
    pub fn is_back(&self) -> bool {
        self.text == BACK
    }
}

/// A category change that should land later unless superseded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingSwitch {
    pub category: Category,
    pub generation: u64,
}

/// What the caller must do after a quick reply is picked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// Sentinel picked; the menu is already back at the root.
    Back,
    Send {
        text: String,
        switch: Option<PendingSwitch>,
    },
}

#[derive(Debug, Clone)]
pub struct QuickReplyNavigator {
    current: Category,
    active: Vec<QuickQuestion>,
    generation: u64,
}

impl Default for QuickReplyNavigator {
    fn default() -> Self {
        Self::new()
    }
}

impl QuickReplyNavigator {
    pub fn new() -> Self {
        Self {
            current: Category::Main,
            active: Category::Main.questions(),
            generation: 0,
        }
    }

    pub fn current(&self) -> Category {
        self.current
    }

    pub fn questions(&self) -> &[QuickQuestion] {
        &self.active
    }

    /// Every navigation bumps this; delayed switches from older
    /// generations are dropped.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn select(&mut self, question: &QuickQuestion) -> Selection {
        if question.is_back() {
            self.go_to(Category::Main);
            return Selection::Back;
        }

        let switch = question.category.map(|category| {
            self.generation += 1;
            PendingSwitch {
                category,
                generation: self.generation,
            }
        });

        Selection::Send {
            text: question.text.clone(),
            switch,
        }
    }

    pub fn go_to(&mut self, category: Category) {
        self.generation += 1;
        self.current = category;
        self.active = category.questions();
    }

    /// Land a delayed switch. Returns false if another navigation happened
    /// since it was issued.
    pub fn apply(&mut self, switch: PendingSwitch) -> bool {
        if switch.generation != self.generation {
            return false;
        }
        self.current = switch.category;
        self.active = switch.category.questions();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(nav: &QuickReplyNavigator, text: &str) -> QuickQuestion {
        nav.questions()
            .iter()
            .find(|q| q.text == text)
            .cloned()
            .unwrap()
    }

    #[test]
    fn test_starts_at_main() {
        let nav = QuickReplyNavigator::new();
        assert_eq!(nav.current(), Category::Main);
        assert_eq!(nav.questions(), Category::Main.questions().as_slice());
    }

    #[test]
    fn test_every_leaf_ends_with_back() {
        for category in Category::all() {
            let questions = category.questions();
            assert!(!questions.is_empty());
            if category == Category::Main {
                assert!(questions.iter().all(|q| !q.is_back()));
            } else {
                assert!(questions.last().unwrap().is_back(), "{:?}", category);
            }
        }
    }

    #[test]
    fn test_ids_unique_within_category() {
        for category in Category::all() {
            let mut ids: Vec<u32> = category.questions().iter().map(|q| q.id).collect();
            let len = ids.len();
            ids.dedup();
            assert_eq!(ids.len(), len);
        }
    }

    #[test]
    fn test_back_from_every_leaf_returns_to_main() {
        for category in Category::all().into_iter().skip(1) {
            let mut nav = QuickReplyNavigator::new();
            nav.go_to(category);
            let back = question(&nav, BACK);
            assert_eq!(nav.select(&back), Selection::Back);
            assert_eq!(nav.current(), Category::Main);
            assert_eq!(nav.questions(), Category::Main.questions().as_slice());
        }
    }

    #[test]
    fn test_category_question_yields_pending_switch() {
        let mut nav = QuickReplyNavigator::new();
        let q = question(&nav, "ЭМД-ын хөнгөлөлттэй эмийн жагсаалт");
        let Selection::Send { text, switch } = nav.select(&q) else {
            panic!("expected a send");
        };
        assert_eq!(text, "ЭМД-ын хөнгөлөлттэй эмийн жагсаалт");
        let switch = switch.unwrap();
        assert_eq!(switch.category, Category::Medicine);
        // Nothing changes until the switch lands
        assert_eq!(nav.current(), Category::Main);
        assert!(nav.apply(switch));
        assert_eq!(nav.current(), Category::Medicine);
    }

    #[test]
    fn test_leaf_question_stays_in_leaf() {
        let mut nav = QuickReplyNavigator::new();
        nav.go_to(Category::Medicine);
        let q = question(&nav, "Парацетамол хөнгөлөлттэй юу?");
        let selection = nav.select(&q);
        assert!(matches!(selection, Selection::Send { switch: None, .. }));
        assert_eq!(nav.current(), Category::Medicine);
    }

    #[test]
    fn test_superseded_switch_is_dropped() {
        let mut nav = QuickReplyNavigator::new();
        let q = question(&nav, "Ямар эмнэлгүүд ЭМД-тэй гэрээтэй вэ?");
        let Selection::Send { switch: Some(first), .. } = nav.select(&q) else {
            panic!("expected a switch");
        };
        let q = question(&nav, "ЭМД-аар ямар үйлчилгээ авж болох вэ?");
        let Selection::Send { switch: Some(second), .. } = nav.select(&q) else {
            panic!("expected a switch");
        };

        assert!(!nav.apply(first));
        assert_eq!(nav.current(), Category::Main);
        assert!(nav.apply(second));
        assert_eq!(nav.current(), Category::Services);
    }

    #[test]
    fn test_back_cancels_pending_switch() {
        let mut nav = QuickReplyNavigator::new();
        let q = question(&nav, "ЭМД-ийн хураамж хэд вэ?");
        let Selection::Send { switch: Some(switch), .. } = nav.select(&q) else {
            panic!("expected a switch");
        };
        nav.go_to(Category::Main);
        assert!(!nav.apply(switch));
        assert_eq!(nav.current(), Category::Main);
    }
}
