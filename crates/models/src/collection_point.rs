use std::fmt;

use serde::{Deserialize, Serialize};

use crate::Extra;

/// A physical drop-off location. `(0.0, 0.0)` means the address was never geocoded.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CollectionPoint {
    pub id: String,
    pub name: String,
    /// One of the [`WasteType`] slugs, stored under `type`.
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, deserialize_with = "crate::null_as_default")]
    pub address: String,
    #[serde(default, deserialize_with = "crate::null_as_default")]
    pub lat: f64,
    #[serde(default, deserialize_with = "crate::null_as_default")]
    pub lon: f64,
    #[serde(flatten)]
    pub extra: Extra,
}

impl CollectionPoint {
    pub fn is_located(&self) -> bool {
        !(self.lat == 0.0 && self.lon == 0.0)
    }

    pub fn waste_type(&self) -> WasteType {
        WasteType::parse(&self.kind)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WasteType {
    Pilhas,
    Oleo,
    Eletronico,
    Plastico,
    Vidro,
    Papel,
    Metal,
    Other,
}

impl WasteType {
    /// The categories shown on the waste information page, in display order.
    pub const CATALOG: [WasteType; 7] = [
        WasteType::Pilhas,
        WasteType::Oleo,
        WasteType::Eletronico,
        WasteType::Plastico,
        WasteType::Vidro,
        WasteType::Papel,
        WasteType::Metal,
    ];

    /// Unknown slugs map to `Other`.
    pub fn parse(raw: &str) -> WasteType {
        match raw.trim().to_lowercase().as_str() {
            "pilhas" => WasteType::Pilhas,
            "oleo" => WasteType::Oleo,
            "eletronico" => WasteType::Eletronico,
            "plastico" => WasteType::Plastico,
            "vidro" => WasteType::Vidro,
            "papel" => WasteType::Papel,
            "metal" => WasteType::Metal,
            _ => WasteType::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WasteType::Pilhas => "pilhas",
            WasteType::Oleo => "oleo",
            WasteType::Eletronico => "eletronico",
            WasteType::Plastico => "plastico",
            WasteType::Vidro => "vidro",
            WasteType::Papel => "papel",
            WasteType::Metal => "metal",
            WasteType::Other => "other",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            WasteType::Pilhas => "Pilhas e baterias",
            WasteType::Oleo => "Óleo de cozinha",
            WasteType::Eletronico => "Lixo Eletrônico",
            WasteType::Plastico => "Plástico",
            WasteType::Vidro => "Vidro",
            WasteType::Papel => "Papel",
            WasteType::Metal => "Metal",
            WasteType::Other => "Outros",
        }
    }

    pub fn guidance(&self) -> &'static str {
        match self {
            WasteType::Pilhas => "Leve até pontos de coleta autorizados. Nunca descarte em lixo comum.",
            WasteType::Oleo => "Armazene em garrafa plástica e entregue em pontos de coleta.",
            WasteType::Eletronico => "Computadores, celulares e cabos devem ser reciclados separadamente.",
            WasteType::Plastico => "Lave as embalagens antes de descartar na coleta seletiva.",
            WasteType::Vidro => "Separe vidros quebrados em caixas de papelão para evitar acidentes.",
            WasteType::Papel => "Papéis secos e limpos podem ser reciclados. Evite amassar.",
            WasteType::Metal => "Latas de alumínio e aço são 100% recicláveis.",
            WasteType::Other => "Consulte o ponto de coleta antes de levar o material.",
        }
    }
}

impl fmt::Display for WasteType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_is_stored_under_type_key() {
        let p = CollectionPoint { id: "c1".into(), name: "Eco".into(), kind: "vidro".into(), ..Default::default() };
        let v = serde_json::to_value(&p).unwrap();
        assert_eq!(v["type"], "vidro");
        assert_eq!(p.waste_type(), WasteType::Vidro);
        assert!(!p.is_located());
    }

    #[test]
    fn null_coordinates_mean_not_located() {
        let p: CollectionPoint =
            serde_json::from_str(r#"{"id":"c1","name":"Eco","type":"vidro","address":null,"lat":null,"lon":null}"#).unwrap();
        assert!(!p.is_located());
        assert!(p.extra.is_empty());
    }

    #[test]
    fn unknown_slugs_are_other() {
        assert_eq!(WasteType::parse(" PILHAS "), WasteType::Pilhas);
        assert_eq!(WasteType::parse("isopor"), WasteType::Other);
        assert_eq!(WasteType::Metal.to_string(), "metal");
    }
}
