//! Fixed reference building population for Timóteo (MG).
//!
//! Neighborhood totals from the municipal property registry, used as
//! the IIP denominator. This is reference data: it does not vary with
//! how many properties were actually inspected in a cycle.

/// Total registered buildings per neighborhood.
pub const NEIGHBORHOOD_PROPERTIES: &[(&str, u64)] = &[
    ("Alegre", 1631),
    ("Alphaville", 728),
    ("Alvorada I", 606),
    ("Alvorada II", 910),
    ("Ana Malaquias", 595),
    ("Ana Moura", 1657),
    ("Ana Rita", 2080),
    ("Arataquinha", 95),
    ("Bairro dos Vieiras", 503),
    ("Bandeirantes", 226),
    ("Bela Vista", 759),
    ("Bromélias", 1344),
    ("Cachoeira Do Vale", 2267),
    ("Centro Norte", 1793),
    ("Centro Sul", 1158),
    ("Coqueiro", 78),
    ("Cruzeirinho", 557),
    ("Distrito Industrial", 145),
    ("Eldorado", 1174),
    ("Esplanada", 164),
    ("Fazenda Boa Vista", 203),
    ("Ferroviários", 84),
    ("Funcionários", 853),
    ("Garapa", 170),
    ("Jardim Primavera", 291),
    ("Jardim Vitória", 236),
    ("Jhon Kennedy", 389),
    ("João XXIII", 942),
    ("Limoeiro", 966),
    ("Macuco", 1466),
    ("Nossa Senhora das Graças", 447),
    ("Nova Esperança", 282),
    ("Novo Horizonte", 862),
    ("Novo Tempo", 1733),
    ("Olaria", 852),
    ("Parque Recanto", 96),
    ("Petrópolis", 622),
    ("Primavera", 2167),
    ("Quitandinha", 901),
    ("Recanto do Sossego", 202),
    ("Recanto Verde", 2770),
    ("Santa Cecília", 662),
    ("Santa Maria", 836),
    ("Santa Rita", 94),
    ("Santa Terezinha", 701),
    ("São Cristóvão", 385),
    ("São José", 850),
    ("Serenata", 429),
    ("Timirim", 1114),
    ("Timotinho", 498),
    ("Vale Verde", 280),
    ("Vila dos Técnicos", 242),
];

/// Registered buildings in one neighborhood, or 0 when the name is not
/// in the registry (free-text neighborhoods from the field sheets).
#[must_use]
pub fn properties_in(neighborhood: &str) -> u64 {
    NEIGHBORHOOD_PROPERTIES
        .iter()
        .find(|(name, _)| *name == neighborhood)
        .map_or(0, |(_, total)| *total)
}

/// Registered buildings across the whole municipality.
#[must_use]
pub fn total_properties() -> u64 {
    NEIGHBORHOOD_PROPERTIES
        .iter()
        .map(|(_, total)| total)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_neighborhood_resolves() {
        assert_eq!(properties_in("Alegre"), 1631);
        assert_eq!(properties_in("Recanto Verde"), 2770);
    }

    #[test]
    fn unknown_neighborhood_resolves_to_zero() {
        assert_eq!(properties_in("Bairro Inexistente"), 0);
        assert_eq!(properties_in(""), 0);
    }

    #[test]
    fn municipality_total_covers_all_neighborhoods() {
        let total = total_properties();
        assert!(total > properties_in("Recanto Verde"));
        assert_eq!(
            total,
            NEIGHBORHOOD_PROPERTIES.iter().map(|(_, n)| n).sum::<u64>()
        );
    }
}
