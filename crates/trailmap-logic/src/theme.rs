//! Adventure themes - terrain palettes, node icons and flavor vocabularies.
//!
//! Each [`Theme`] maps to a static [`ThemePalette`]. Generators take a palette
//! reference rather than the enum so degenerate palettes can be fed in directly.

use serde::{Deserialize, Serialize};

// ============================================================================
// THEMES
// ============================================================================

/// Selectable adventure world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Theme {
    /// Woods, meadows and streams.
    Forest = 0,
    /// Reefs, kelp and sunken wrecks.
    Ocean = 1,
    /// Planets, nebulae and asteroid belts.
    Space = 2,
    /// Glaciers, tundra and ice caves.
    Arctic = 3,
}

impl Theme {
    pub const ALL: [Theme; 4] = [Theme::Forest, Theme::Ocean, Theme::Space, Theme::Arctic];

    pub fn palette(&self) -> &'static ThemePalette {
        match self {
            Self::Forest => &FOREST,
            Self::Ocean => &OCEAN,
            Self::Space => &SPACE,
            Self::Arctic => &ARCTIC,
        }
    }

    pub fn name(&self) -> &'static str {
        self.palette().name
    }

    pub fn from_u8(val: u8) -> Option<Self> {
        match val {
            0 => Some(Self::Forest),
            1 => Some(Self::Ocean),
            2 => Some(Self::Space),
            3 => Some(Self::Arctic),
            _ => None,
        }
    }
}

// ============================================================================
// PALETTE DATA
// ============================================================================

/// Static description of one terrain type.
#[derive(Debug, Clone, Copy)]
pub struct TerrainSpec {
    pub name: &'static str,
    pub primary_color: &'static str,
    pub secondary_color: &'static str,
    pub decoration_icons: &'static [&'static str],
    /// Fraction of the rolled decoration count actually placed, in [0,1].
    pub decoration_density: f32,
}

/// Four parallel word lists used to build discovery flavor text.
#[derive(Debug, Clone, Copy)]
pub struct DiscoveryVocabulary {
    pub names: &'static [&'static str],
    pub species: &'static [&'static str],
    pub descriptions: &'static [&'static str],
    pub fun_facts: &'static [&'static str],
}

/// An ambient map event kind (name + icon).
#[derive(Debug, Clone, Copy)]
pub struct EventSpec {
    pub name: &'static str,
    pub icon: &'static str,
}

/// Everything a theme contributes to generation and simulation.
#[derive(Debug, Clone, Copy)]
pub struct ThemePalette {
    pub name: &'static str,
    pub music_track: &'static str,
    pub terrains: &'static [TerrainSpec],
    pub node_icons: &'static [&'static str],
    pub vocabulary: DiscoveryVocabulary,
    pub events: &'static [EventSpec],
    pub action_sounds: &'static [&'static str],
}

static FOREST: ThemePalette = ThemePalette {
    name: "Enchanted Forest",
    music_track: "forest_theme",
    terrains: &[
        TerrainSpec {
            name: "Meadow",
            primary_color: "#8BC34A",
            secondary_color: "#C5E1A5",
            decoration_icons: &["🌼", "🌷", "🌾"],
            decoration_density: 0.8,
        },
        TerrainSpec {
            name: "Deep Woods",
            primary_color: "#2E7D32",
            secondary_color: "#1B5E20",
            decoration_icons: &["🌲", "🌳", "🍄"],
            decoration_density: 1.0,
        },
        TerrainSpec {
            name: "Babbling Brook",
            primary_color: "#4FC3F7",
            secondary_color: "#81D4FA",
            decoration_icons: &["🪨", "🐸", "💧"],
            decoration_density: 0.5,
        },
        TerrainSpec {
            name: "Mossy Hills",
            primary_color: "#689F38",
            secondary_color: "#AED581",
            decoration_icons: &["🪵", "🌿", "🐌"],
            decoration_density: 0.6,
        },
    ],
    node_icons: &["🏕️", "🌳", "🍄", "🦉", "🪺"],
    vocabulary: DiscoveryVocabulary {
        names: &["Sparkle Beetle", "Moss Sprite", "Giggle Toad", "Acorn Owl", "Fern Fox"],
        species: &[
            "Lumina coleoptera",
            "Muscus pixius",
            "Bufo risus",
            "Strix glandis",
            "Vulpes filix",
        ],
        descriptions: &[
            "Its shell shimmers like morning dew.",
            "It naps on soft moss pillows all afternoon.",
            "Its croak sounds just like a giggle!",
            "It keeps a tiny acorn collection in its nest.",
            "It hides under giant ferns to play peekaboo.",
        ],
        fun_facts: &[
            "Some beetles can glow in the dark!",
            "Moss can hold twenty times its weight in water.",
            "Toads drink water through their skin.",
            "Owls can turn their heads almost all the way around.",
            "Foxes use their fluffy tails like a blanket.",
        ],
    },
    events: &[
        EventSpec {
            name: "Butterfly Parade",
            icon: "🦋",
        },
        EventSpec {
            name: "Rainbow",
            icon: "🌈",
        },
        EventSpec {
            name: "Squirrel Race",
            icon: "🐿️",
        },
    ],
    action_sounds: &["rustle", "birdsong", "twig_snap"],
};

static OCEAN: ThemePalette = ThemePalette {
    name: "Ocean Deep",
    music_track: "ocean_theme",
    terrains: &[
        TerrainSpec {
            name: "Coral Reef",
            primary_color: "#FF8A65",
            secondary_color: "#FFCCBC",
            decoration_icons: &["🪸", "🐠", "🐚"],
            decoration_density: 1.0,
        },
        TerrainSpec {
            name: "Kelp Forest",
            primary_color: "#00796B",
            secondary_color: "#4DB6AC",
            decoration_icons: &["🌿", "🐡", "🦀"],
            decoration_density: 0.8,
        },
        TerrainSpec {
            name: "Sandy Shallows",
            primary_color: "#FFE082",
            secondary_color: "#FFF8E1",
            decoration_icons: &["🐚", "⭐", "🦀"],
            decoration_density: 0.5,
        },
        TerrainSpec {
            name: "Midnight Trench",
            primary_color: "#1A237E",
            secondary_color: "#283593",
            decoration_icons: &["🦑", "🐙", "✨"],
            decoration_density: 0.4,
        },
    ],
    node_icons: &["⚓", "🐚", "🏝️", "🐢", "🐳"],
    vocabulary: DiscoveryVocabulary {
        names: &["Bubble Puffer", "Rainbow Ray", "Giggly Octopus", "Sleepy Seahorse", "Pearl Crab"],
        species: &[
            "Tetraodon bullae",
            "Manta iris",
            "Octopus risor",
            "Hippocampus somnus",
            "Cancer margarita",
        ],
        descriptions: &[
            "It blows bubbles when it is happy.",
            "Its fins ripple with every color of the rainbow.",
            "It waves all eight arms to say hello.",
            "It holds onto seaweed while it naps.",
            "It guards a shiny pearl in its burrow.",
        ],
        fun_facts: &[
            "Pufferfish can inflate to twice their size!",
            "Manta rays have the biggest brains of any fish.",
            "Octopuses have three hearts.",
            "Seahorse dads carry the babies.",
            "Crabs walk sideways because of how their legs bend.",
        ],
    },
    events: &[
        EventSpec {
            name: "Dolphin Pod",
            icon: "🐬",
        },
        EventSpec {
            name: "Whale Song",
            icon: "🐋",
        },
        EventSpec {
            name: "Jellyfish Glow",
            icon: "🪼",
        },
    ],
    action_sounds: &["splash", "bubbles", "whale_call"],
};

static SPACE: ThemePalette = ThemePalette {
    name: "Starry Space",
    music_track: "space_theme",
    terrains: &[
        TerrainSpec {
            name: "Nebula Cloud",
            primary_color: "#7E57C2",
            secondary_color: "#B39DDB",
            decoration_icons: &["✨", "💫", "🌟"],
            decoration_density: 0.9,
        },
        TerrainSpec {
            name: "Asteroid Belt",
            primary_color: "#5D4037",
            secondary_color: "#8D6E63",
            decoration_icons: &["🪨", "☄️", "🌑"],
            decoration_density: 1.0,
        },
        TerrainSpec {
            name: "Moon Dust Plains",
            primary_color: "#BDBDBD",
            secondary_color: "#EEEEEE",
            decoration_icons: &["🌕", "🕳️", "👣"],
            decoration_density: 0.5,
        },
        TerrainSpec {
            name: "Deep Void",
            primary_color: "#0D1B2A",
            secondary_color: "#1B263B",
            decoration_icons: &["⭐", "🛰️", "🌌"],
            decoration_density: 0.3,
        },
    ],
    node_icons: &["🪐", "🚀", "🌍", "🛸", "🌙"],
    vocabulary: DiscoveryVocabulary {
        names: &["Star Jelly", "Comet Pup", "Moon Moth", "Nova Snail", "Orbit Otter"],
        species: &[
            "Stella gelata",
            "Cometa catulus",
            "Luna phalaena",
            "Nova limax",
            "Lutra orbitalis",
        ],
        descriptions: &[
            "It wobbles and twinkles between the stars.",
            "It chases comets like a puppy chases balls.",
            "Its wings glow silver in the moonlight.",
            "It leaves a sparkly trail wherever it goes.",
            "It floats on its back and spins in circles.",
        ],
        fun_facts: &[
            "There are more stars in space than grains of sand on Earth!",
            "Comets have tails that always point away from the Sun.",
            "The Moon slowly moves away from Earth every year.",
            "A day on Venus is longer than its year.",
            "Astronauts grow a little taller in space.",
        ],
    },
    events: &[
        EventSpec {
            name: "Meteor Shower",
            icon: "🌠",
        },
        EventSpec {
            name: "Friendly Alien",
            icon: "👽",
        },
        EventSpec {
            name: "Solar Flare",
            icon: "☀️",
        },
    ],
    action_sounds: &["beep", "whoosh", "laser"],
};

static ARCTIC: ThemePalette = ThemePalette {
    name: "Frosty Arctic",
    music_track: "arctic_theme",
    terrains: &[
        TerrainSpec {
            name: "Snowfield",
            primary_color: "#ECEFF1",
            secondary_color: "#FFFFFF",
            decoration_icons: &["❄️", "⛄", "🌨️"],
            decoration_density: 0.7,
        },
        TerrainSpec {
            name: "Glacier",
            primary_color: "#81D4FA",
            secondary_color: "#B3E5FC",
            decoration_icons: &["🧊", "🏔️", "💎"],
            decoration_density: 0.6,
        },
        TerrainSpec {
            name: "Frozen Lake",
            primary_color: "#4FC3F7",
            secondary_color: "#E1F5FE",
            decoration_icons: &["⛸️", "🐟", "🧊"],
            decoration_density: 0.4,
        },
        TerrainSpec {
            name: "Pine Tundra",
            primary_color: "#546E7A",
            secondary_color: "#90A4AE",
            decoration_icons: &["🌲", "🦌", "🪨"],
            decoration_density: 0.8,
        },
    ],
    node_icons: &["🏔️", "🐧", "🧊", "🛖", "🦭"],
    vocabulary: DiscoveryVocabulary {
        names: &["Snowball Seal", "Frost Fox", "Icicle Bird", "Polar Puff", "Aurora Hare"],
        species: &[
            "Phoca nivalis",
            "Vulpes gelida",
            "Avis stiria",
            "Ursus pomponius",
            "Lepus aurorae",
        ],
        descriptions: &[
            "It rolls around in the snow like a ball.",
            "Its white coat makes it almost invisible.",
            "It sings a tinkly song like icicles in the wind.",
            "It is so fluffy it bounces when it lands.",
            "Its ears shimmer green under the northern lights.",
        ],
        fun_facts: &[
            "Seals can hold their breath for over an hour!",
            "Arctic foxes change color with the seasons.",
            "Snowflakes always have six sides.",
            "Polar bears have black skin under their white fur.",
            "The northern lights are caused by particles from the Sun.",
        ],
    },
    events: &[
        EventSpec {
            name: "Northern Lights",
            icon: "🌌",
        },
        EventSpec {
            name: "Penguin Slide",
            icon: "🐧",
        },
        EventSpec {
            name: "Snow Flurry",
            icon: "🌨️",
        },
    ],
    action_sounds: &["crunch", "wind", "ice_crack"],
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_theme_roundtrip() {
        for i in 0..4u8 {
            let theme = Theme::from_u8(i).unwrap();
            assert_eq!(theme as u8, i);
        }
        assert!(Theme::from_u8(99).is_none());
    }

    #[test]
    fn test_palettes_are_complete() {
        for theme in Theme::ALL {
            let p = theme.palette();
            assert!(p.terrains.len() >= 3, "{} needs 3+ terrains", p.name);
            assert!(!p.node_icons.is_empty());
            assert!(!p.events.is_empty());
            assert!(!p.action_sounds.is_empty());
            for t in p.terrains {
                assert!((0.0..=1.0).contains(&t.decoration_density));
                assert!(!t.decoration_icons.is_empty());
            }
        }
    }

    #[test]
    fn test_vocabulary_lists_are_parallel() {
        for theme in Theme::ALL {
            let v = theme.palette().vocabulary;
            assert!(!v.names.is_empty());
            assert_eq!(v.names.len(), v.species.len());
            assert_eq!(v.names.len(), v.descriptions.len());
            assert_eq!(v.names.len(), v.fun_facts.len());
        }
    }

    #[test]
    fn test_terrain_names_unique_per_theme() {
        for theme in Theme::ALL {
            let terrains = theme.palette().terrains;
            for (i, a) in terrains.iter().enumerate() {
                for b in &terrains[i + 1..] {
                    assert_ne!(a.name, b.name);
                }
            }
        }
    }
}
