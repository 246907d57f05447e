//! Ornament class table
//!
//! Order matches the training label order of the model head; the logit at
//! position `i` belongs to `CLASSES[i]`.

use serde::Serialize;

/// Number of output classes of the model head
pub const NUM_CLASSES: usize = 17;

/// One ornament category
#[derive(Debug, Clone, Copy, Serialize)]
pub struct OrnamentClass {
    pub index: usize,
    pub name: &'static str,
    pub description: &'static str,
    pub region: &'static str,
    pub occasion: &'static str,
}

const fn class(
    index: usize,
    name: &'static str,
    description: &'static str,
    region: &'static str,
    occasion: &'static str,
) -> OrnamentClass {
    OrnamentClass { index, name, description, region, occasion }
}

pub static CLASSES: [OrnamentClass; NUM_CLASSES] = [
    class(
        0,
        "Bajuband",
        "Bajuband is a traditional armlet worn on the upper arm, often associated with royal and bridal attire.",
        "Maharashtra, Rajasthan",
        "Weddings, festivals",
    ),
    class(
        1,
        "Bakuli Haar",
        "Bakuli Haar is a floral-inspired gold necklace resembling jasmine buds, symbolizing purity and elegance.",
        "Maharashtra",
        "Traditional ceremonies, weddings",
    ),
    class(
        2,
        "Bugadi",
        "Bugadi is a distinctive ear ornament worn on the upper cartilage of the ear, common in rural traditions.",
        "Maharashtra, Karnataka",
        "Daily traditional wear, festivals",
    ),
    class(
        3,
        "Chinchpeti",
        "Chinchpeti is a pearl choker necklace that sits close to the neck and is a staple of Maharashtrian bridal jewelry.",
        "Maharashtra",
        "Weddings",
    ),
    class(
        4,
        "Jodvi",
        "Jodvi are toe rings traditionally worn by married women, symbolizing marital status.",
        "Across India",
        "Daily wear after marriage",
    ),
    class(
        5,
        "Kambarpatta",
        "Kambarpatta is an ornate waist belt worn with sarees, often richly decorated with gold motifs.",
        "Maharashtra, Karnataka",
        "Weddings, classical dance",
    ),
    class(
        6,
        "Kolhapuri Saaj",
        "Kolhapuri Saaj is a heavy traditional necklace featuring multiple symbolic pendants.",
        "Kolhapur, Maharashtra",
        "Weddings, religious ceremonies",
    ),
    class(
        7,
        "Kudya",
        "Kudya are traditional ear studs often made of pearls or gemstones, worn daily.",
        "Maharashtra",
        "Daily traditional wear",
    ),
    class(
        8,
        "Laxmi Haar",
        "Laxmi Haar is a long necklace featuring Goddess Laxmi motifs, symbolizing wealth and prosperity.",
        "Maharashtra, South India",
        "Weddings, festivals",
    ),
    class(
        9,
        "Mangalsutra",
        "Mangalsutra is a sacred black-beaded necklace worn by married women as a symbol of marriage.",
        "Across India",
        "Daily wear after marriage",
    ),
    class(
        10,
        "Mohan Mala",
        "Mohan Mala is a long necklace made of closely spaced gold beads, giving a regal appearance.",
        "Maharashtra",
        "Weddings, festive occasions",
    ),
    class(
        11,
        "Nath",
        "Nath is a traditional nose ring, often pearl-studded, and an important part of bridal jewelry.",
        "Maharashtra, North India",
        "Weddings, festivals",
    ),
    class(
        12,
        "Patlya",
        "Patlya are flat, broad gold bangles usually worn in pairs, symbolizing prosperity.",
        "Maharashtra",
        "Weddings, daily traditional wear",
    ),
    class(
        13,
        "Surya Haar",
        "Surya Haar is a necklace featuring a sun-shaped pendant, representing energy and power.",
        "Maharashtra",
        "Festivals, weddings",
    ),
    class(
        14,
        "Tanmani",
        "Tanmani is a pearl choker necklace with a central pendant, known for its delicate craftsmanship.",
        "Maharashtra",
        "Weddings, traditional functions",
    ),
    class(
        15,
        "Thushi",
        "Thushi is a tightly strung choker made of gold beads, a hallmark of Maharashtrian jewelry.",
        "Maharashtra",
        "Weddings",
    ),
    class(
        16,
        "Tode",
        "Tode are heavy, intricately carved bangles traditionally worn by brides.",
        "Maharashtra",
        "Weddings",
    ),
];

/// Label for a class index
pub fn label(index: usize) -> Option<&'static str> {
    CLASSES.get(index).map(|c| c.name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indices_match_positions() {
        for (i, class) in CLASSES.iter().enumerate() {
            assert_eq!(class.index, i, "{} has wrong index", class.name);
        }
    }

    #[test]
    fn test_training_order() {
        assert_eq!(label(0), Some("Bajuband"));
        assert_eq!(label(6), Some("Kolhapuri Saaj"));
        assert_eq!(label(9), Some("Mangalsutra"));
        assert_eq!(label(16), Some("Tode"));
        assert_eq!(label(NUM_CLASSES), None);
    }

    #[test]
    fn test_names_unique_and_described() {
        let mut names: Vec<_> = CLASSES.iter().map(|c| c.name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), NUM_CLASSES);
        assert!(CLASSES.iter().all(|c| c.description.starts_with(c.name)));
    }
}
