//! Static MPK catalog, vendor overrides and code option lists.

use serde::Serialize;

/// A classification category with its codes and scoring keywords.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Category {
    pub id: &'static str,
    /// Display name, `Group - Subcategory`.
    pub name: &'static str,
    pub mpk: &'static str,
    pub group: &'static str,
    pub keywords: &'static [&'static str],
}

/// Fixed codes for vendors recognized by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VendorOverride {
    /// Every pattern must occur somewhere in the folded vendor name.
    pub patterns: &'static [&'static str],
    pub mpk: &'static str,
    pub group: &'static str,
    pub description: &'static str,
}

/// A selectable MPK or group code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CodeOption {
    pub code: &'static str,
    pub name: &'static str,
    pub description: &'static str,
}

macro_rules! category {
    ($id:expr, $name:expr, $mpk:expr, $group:expr, [$($kw:expr),* $(,)?]) => {
        Category { id: $id, name: $name, mpk: $mpk, group: $group, keywords: &[$($kw),*] }
    };
}

macro_rules! code {
    ($code:expr, $name:expr, $description:expr) => {
        CodeOption { code: $code, name: $name, description: $description }
    };
}

/// Catalog in scoring order. Earlier entries win ties.
pub static CATEGORIES: &[Category] = &[
    // Administracja
    category!("admin-office", "Administracja - Materiały biurowe", "MPK100", "1/1",
        ["materiały", "biurowe", "papier", "długopisy", "teczki", "office", "supplies"]),
    category!("admin-tech", "Administracja - Urządzenia techniczne", "MPK110", "1/2",
        ["urządzenia", "techniczne", "sprzęt", "equipment", "technical"]),
    category!("admin-services", "Administracja - Usługi zewnętrzne", "MPK121", "1/4",
        ["usługi", "zewnętrzne", "serwis", "maintenance", "external", "services"]),
    category!("admin-surveillance", "Administracja - Nadzór/monitoring", "MPK130", "1/6",
        ["monitoring", "nadzór", "surveillance", "security", "kamery", "cameras"]),
    category!("admin-cleaning", "Administracja - Środki czystości", "MPK131", "1/7",
        ["czystość", "środki", "cleaning", "detergenty", "sprzątanie"]),
    category!("admin-banking", "Administracja - Opłaty bankowe", "MPK140", "1/9",
        ["bank", "opłaty", "prowizja", "banking", "fees", "commission"]),
    category!("admin-it", "Administracja - IT/Informatyka", "MPK150", "1/10",
        ["informatyka", "it", "computer", "software", "hardware", "system"]),
    category!("admin-accounting", "Administracja - Księgowość", "MPK160", "1/11",
        ["księgowość", "accounting", "rachunkowość", "księgowa"]),
    category!("admin-audit", "Administracja - Audyt energetyczny", "MPK170", "1/12",
        ["audyt", "energetyczny", "energia", "energy", "audit"]),
    category!("admin-hr", "Administracja - Programy administracyjne", "MPK180", "1/13",
        ["programy", "administracyjne", "hr", "kadry", "personnel"]),
    category!("admin-legal", "Administracja - Usługi prawne", "MPK190", "1/14",
        ["prawne", "legal", "adwokat", "kancelaria", "law", "lawyer"]),
    category!("admin-consulting", "Administracja - Doradztwo", "MPK191", "1/15",
        ["doradztwo", "consulting", "consultant", "advisory"]),
    category!("admin-services2", "Administracja - Usługi", "MPK192", "1/16",
        ["usługi", "services", "serwis"]),
    category!("admin-telecom", "Administracja - Telefon", "MPK193", "1/17",
        ["telefon", "telekomunikacja", "phone", "telecom", "mobile"]),
    category!("admin-insurance", "Administracja - Ubezpieczenia", "MPK194", "1/18",
        ["ubezpieczenia", "insurance", "polisa", "policy"]),
    category!("admin-gas", "Administracja - Gaz", "MPK195", "1/19",
        ["gaz", "gas", "heating", "ogrzewanie"]),
    category!("admin-electricity", "Administracja - Energia elektryczna", "MPK196", "1/20",
        ["energia", "elektryczna", "electricity", "power", "prąd"]),
    category!("admin-provisions", "Administracja - Zakupy spożywcze", "MPK197", "1/21",
        ["spożywcze", "zakupy", "żywność", "food", "groceries"]),
    category!("admin-legal-advice", "Administracja - Porady prawne", "MPK199", "1/23",
        ["porady", "prawne", "legal", "advice", "consultation"]),
    // Marketing
    category!("marketing-general", "Marketing", "MPK400", "4/1",
        ["marketing", "reklama", "promotion", "advertising", "media", "social"]),
    category!("marketing-digital", "Marketing - Media społecznościowe", "MPK410", "4/4",
        ["social", "media", "facebook", "instagram", "linkedin", "twitter"]),
    category!("marketing-print", "Marketing - Wystawiennictwo artykułów", "MPK420", "4/5",
        ["wystawiennictwo", "artykuły", "exhibition", "articles", "print"]),
    category!("marketing-events", "Marketing - Warsztaty", "MPK430", "4/6",
        ["warsztaty", "workshops", "szkolenia", "training", "events"]),
    category!("marketing-website", "Marketing - Strona www", "MPK440", "4/8",
        ["strona", "www", "website", "web", "portal", "internet"]),
    category!("marketing-finance", "Marketing - Usługi finansowe", "MPK450", "4/9",
        ["finansowe", "financial", "services", "banking", "credit"]),
    // Operacyjne
    category!("operations-materials", "Operacyjne - Materiał podstawowy", "MPK500", "5/1",
        ["materiał", "podstawowy", "materials", "basic", "raw"]),
    category!("operations-support", "Operacyjne - Materiał pomocniczy", "MPK510", "5/2",
        ["pomocniczy", "auxiliary", "support", "materials"]),
    category!("operations-transport-internal", "Operacyjne - Transport", "MPK520", "5/3",
        ["transport", "wewnętrzny", "internal", "logistics"]),
    category!("operations-waste", "Operacyjne - Masa", "MPK540", "5/5",
        ["masa", "waste", "odpady", "mass"]),
    category!("operations-work", "Operacyjne - Praca ziemne", "MPK570", "5/7",
        ["praca", "ziemne", "earthwork", "excavation"]),
    category!("operations-other", "Operacyjne - Pozostałe", "MPK590", "5/9",
        ["pozostałe", "other", "miscellaneous", "inne"]),
    // Transport
    category!("transport-fuel", "Transport - Paliwo", "MPK710", "7/2",
        ["paliwo", "benzyna", "diesel", "fuel", "gasoline", "petrol", "orlen", "bp", "shell", "lotos", "circle k"]),
    category!("transport-service", "Transport - Zakupy", "MPK720", "7/3",
        ["zakupy", "serwis", "naprawa", "parts", "service", "maintenance", "repair"]),
    category!("transport-fleet", "Transport - Przegląd", "MPK730", "7/4",
        ["przegląd", "inspection", "pojazd", "vehicle", "car", "fleet", "verizon", "gps", "tracking"]),
    category!("transport-aviation", "Transport - Lotnictwo", "MPK740", "7/5",
        ["lotnictwo", "aviation", "samolot", "plane", "aircraft", "flight"]),
    category!("transport-shipping", "Transport - Żegluga", "MPK750", "7/6",
        ["żegluga", "shipping", "morski", "maritime", "ship", "vessel"]),
    category!("transport-rail", "Transport - Kolej", "MPK760", "7/7",
        ["kolej", "railway", "train", "rail", "pociąg"]),
    category!("transport-parking", "Transport - Parkowanie", "MPK770", "7/9",
        ["parkowanie", "parking", "opłata", "fees", "zona"]),
    category!("transport-gps", "Transport - GPS", "MPK780", "7/10",
        ["gps", "lokalizacja", "tracking", "navigation", "monitoring"]),
    // Wyposażenie
    category!("equipment-laptop", "Wyposażenie - Laptop", "MPK810", "8/2",
        ["laptop", "computer", "notebook", "komputer"]),
    category!("equipment-monitor", "Wyposażenie - Monitor", "MPK820", "8/3",
        ["monitor", "screen", "display", "ekran"]),
    category!("equipment-etus", "Wyposażenie - Etus", "MPK830", "8/4",
        ["etus", "system", "software"]),
    category!("equipment-phone", "Wyposażenie - Telefon", "MPK840", "8/5",
        ["telefon", "phone", "mobile", "smartphone"]),
    category!("equipment-tablet", "Wyposażenie - Tablet", "MPK870", "8/7",
        ["tablet", "ipad", "android", "touchscreen"]),
    category!("equipment-other", "Wyposażenie - Inne", "MPK880", "8/8",
        ["inne", "other", "wyposażenie", "equipment"]),
    category!("equipment-camera", "Wyposażenie - Kamera", "MPK890", "8/9",
        ["kamera", "camera", "video", "recording"]),
    category!("equipment-router", "Wyposażenie - Router", "MPK900", "8/10",
        ["router", "network", "internet", "wifi", "sieć"]),
    category!("equipment-fiscal", "Wyposażenie - Kasa fiskalna", "MPK920", "8/12",
        ["kasa", "fiskalna", "fiscal", "cash", "register"]),
    // Pozostałe
    category!("other-optimization", "Pozostałe - Optymalizacja", "MPK910", "9/2",
        ["optymalizacja", "optimization", "improvement", "efficiency"]),
    category!("other-accounting", "Pozostałe - Księgowość do analizy", "MPK930", "9/3",
        ["księgowość", "analiza", "accounting", "analysis", "financial"]),
];

const FUEL: &str = "Transport - Paliwo";

/// Overrides in evaluation order. The first full match wins.
pub static VENDOR_OVERRIDES: &[VendorOverride] = &[
    VendorOverride { patterns: &["verizon", "connect"], mpk: "MPK730", group: "7/4", description: "Transport - Lokalizacja GPS pojazdów" },
    VendorOverride { patterns: &["verizon"], mpk: "MPK730", group: "7/4", description: "Transport - Lokalizacja GPS pojazdów" },
    VendorOverride { patterns: &["orlen"], mpk: "MPK710", group: "7/2", description: FUEL },
    VendorOverride { patterns: &["bp"], mpk: "MPK710", group: "7/2", description: FUEL },
    VendorOverride { patterns: &["shell"], mpk: "MPK710", group: "7/2", description: FUEL },
    VendorOverride { patterns: &["lotos"], mpk: "MPK710", group: "7/2", description: FUEL },
    VendorOverride { patterns: &["circle k"], mpk: "MPK710", group: "7/2", description: FUEL },
    VendorOverride { patterns: &["microsoft"], mpk: "MPK150", group: "1/10", description: "Administracja - Licencje IT" },
    VendorOverride { patterns: &["google"], mpk: "MPK410", group: "4/4", description: "Marketing - Reklama online" },
    VendorOverride { patterns: &["facebook"], mpk: "MPK410", group: "4/4", description: "Marketing - Media społecznościowe" },
];

/// MPK codes offered for manual selection.
pub static MPK_OPTIONS: &[CodeOption] = &[
    code!("MPK100", "Materiały biurowe", "Administracja - Materiały biurowe"),
    code!("MPK110", "Urządzenia techniczne", "Administracja - Urządzenia techniczne"),
    code!("MPK121", "Usługi zewnętrzne", "Administracja - Usługi zewnętrzne"),
    code!("MPK130", "Nadzór/monitoring", "Administracja - Nadzór/monitoring"),
    code!("MPK140", "Obsługa klienta", "Administracja - Obsługa klienta"),
    code!("MPK150", "Zarządzanie", "Administracja - Zarządzanie"),
    code!("MPK160", "HR i rekrutacja", "Administracja - HR i rekrutacja"),
    code!("MPK170", "Prawne i compliance", "Administracja - Prawne i compliance"),
    code!("MPK180", "Finanse i księgowość", "Administracja - Finanse i księgowość"),
    code!("MPK190", "IT i systemy", "Administracja - IT i systemy"),
    code!("MPK400", "Reklama online", "Marketing - Reklama online"),
    code!("MPK410", "Reklama tradycyjna", "Marketing - Reklama tradycyjna"),
    code!("MPK420", "Events i promocje", "Marketing - Events i promocje"),
    code!("MPK430", "Materiały marketingowe", "Marketing - Materiały marketingowe"),
    code!("MPK440", "PR i media", "Marketing - PR i media"),
    code!("MPK450", "Badania rynku", "Marketing - Badania rynku"),
    code!("MPK460", "Branding", "Marketing - Branding"),
    code!("MPK470", "Content marketing", "Marketing - Content marketing"),
    code!("MPK480", "Social media", "Marketing - Social media"),
    code!("MPK490", "SEO/SEM", "Marketing - SEO/SEM"),
    code!("MPK500", "Surowce podstawowe", "Operacyjne - Surowce podstawowe"),
    code!("MPK510", "Materiały pomocnicze", "Operacyjne - Materiały pomocnicze"),
    code!("MPK520", "Energia i media", "Operacyjne - Energia i media"),
    code!("MPK530", "Konserwacja i naprawy", "Operacyjne - Konserwacja i naprawy"),
    code!("MPK540", "Kontrola jakości", "Operacyjne - Kontrola jakości"),
    code!("MPK550", "Bezpieczeństwo pracy", "Operacyjne - Bezpieczeństwo pracy"),
    code!("MPK560", "Logistyka wewnętrzna", "Operacyjne - Logistyka wewnętrzna"),
    code!("MPK570", "Magazynowanie", "Operacyjne - Magazynowanie"),
    code!("MPK580", "Produkcja", "Operacyjne - Produkcja"),
    code!("MPK590", "Optymalizacja procesów", "Operacyjne - Optymalizacja procesów"),
    code!("MPK700", "Paliwo", "Transport - Paliwo"),
    code!("MPK710", "Serwis pojazdów", "Transport - Serwis pojazdów"),
    code!("MPK720", "Części zamienne", "Transport - Części zamienne"),
    code!("MPK730", "Ubezpieczenia pojazdów", "Transport - Ubezpieczenia pojazdów"),
    code!("MPK740", "Opłaty drogowe", "Transport - Opłaty drogowe"),
    code!("MPK750", "Logistyka zewnętrzna", "Transport - Logistyka zewnętrzna"),
    code!("MPK760", "Flota pojazdów", "Transport - Flota pojazdów"),
    code!("MPK770", "GPS i tracking", "Transport - GPS i tracking"),
    code!("MPK780", "Kierowcy i personel", "Transport - Kierowcy i personel"),
    code!("MPK790", "Optymalizacja tras", "Transport - Optymalizacja tras"),
    code!("MPK800", "Meble biurowe", "Wyposażenie - Meble biurowe"),
    code!("MPK810", "Sprzęt komputerowy", "Wyposażenie - Sprzęt komputerowy"),
    code!("MPK820", "Maszyny i urządzenia", "Wyposażenie - Maszyny i urządzenia"),
    code!("MPK830", "Narzędzia", "Wyposażenie - Narzędzia"),
    code!("MPK840", "Elektronika", "Wyposażenie - Elektronika"),
    code!("MPK850", "Oprogramowanie", "Wyposażenie - Oprogramowanie"),
    code!("MPK860", "Systemy bezpieczeństwa", "Wyposażenie - Systemy bezpieczeństwa"),
    code!("MPK870", "Klimatyzacja/ogrzewanie", "Wyposażenie - Klimatyzacja/ogrzewanie"),
    code!("MPK880", "Wyposażenie kuchni", "Wyposażenie - Wyposażenie kuchni"),
    code!("MPK890", "Sprzęt medyczny", "Wyposażenie - Sprzęt medyczny"),
    code!("MPK900", "Szkolenia", "Pozostałe - Szkolenia"),
    code!("MPK910", "Doradztwo", "Pozostałe - Doradztwo"),
    code!("MPK920", "Ubezpieczenia", "Pozostałe - Ubezpieczenia"),
    code!("MPK930", "Podróże służbowe", "Pozostałe - Podróże służbowe"),
    code!("MPK940", "Reprezentacja", "Pozostałe - Reprezentacja"),
    code!("MPK950", "Opłaty i składki", "Pozostałe - Opłaty i składki"),
    code!("MPK960", "Usługi bankowe", "Pozostałe - Usługi bankowe"),
    code!("MPK970", "Certyfikaty i licencje", "Pozostałe - Certyfikaty i licencje"),
    code!("MPK980", "Badania i rozwój", "Pozostałe - Badania i rozwój"),
    code!("MPK990", "Inne", "Pozostałe - Inne"),
];

/// Group codes offered for manual selection.
pub static GROUP_OPTIONS: &[CodeOption] = &[
    code!("1/1", "Materiały biurowe", "Administracja - Materiały i podstawowe zasoby biurowe"),
    code!("1/2", "Urządzenia techniczne", "Administracja - Sprzęt i urządzenia techniczne"),
    code!("1/3", "Utrzymanie biura", "Administracja - Utrzymanie i czystość biura"),
    code!("1/4", "Usługi zewnętrzne", "Administracja - Outsourcing i usługi zewnętrzne"),
    code!("1/5", "Zarządzanie", "Administracja - Zarządzanie i nadzór"),
    code!("1/6", "HR", "Administracja - Zasoby ludzkie"),
    code!("1/7", "Finanse", "Administracja - Finanse i księgowość"),
    code!("1/8", "IT", "Administracja - Technologie informatyczne"),
    code!("4/1", "Reklama cyfrowa", "Marketing - Reklama online i cyfrowa"),
    code!("4/2", "Reklama tradycyjna", "Marketing - Media tradycyjne"),
    code!("4/3", "Events", "Marketing - Wydarzenia i promocje"),
    code!("4/4", "Materiały", "Marketing - Materiały marketingowe"),
    code!("4/5", "PR", "Marketing - Public Relations"),
    code!("4/6", "Badania", "Marketing - Badania rynku"),
    code!("4/7", "Branding", "Marketing - Marka i identyfikacja"),
    code!("4/8", "Digital", "Marketing - Marketing cyfrowy"),
    code!("5/1", "Surowce", "Operacyjne - Surowce i materiały podstawowe"),
    code!("5/2", "Materiały pomocnicze", "Operacyjne - Materiały wspomagające produkcję"),
    code!("5/3", "Energia", "Operacyjne - Energia i media"),
    code!("5/4", "Konserwacja", "Operacyjne - Konserwacja i naprawy"),
    code!("5/5", "Jakość", "Operacyjne - Kontrola jakości"),
    code!("5/6", "BHP", "Operacyjne - Bezpieczeństwo i higiena pracy"),
    code!("5/7", "Logistyka", "Operacyjne - Logistyka wewnętrzna"),
    code!("5/8", "Produkcja", "Operacyjne - Procesy produkcyjne"),
    code!("7/1", "Paliwo", "Transport - Paliwo i oleje"),
    code!("7/2", "Serwis", "Transport - Serwis i naprawa pojazdów"),
    code!("7/3", "Części", "Transport - Części zamienne"),
    code!("7/4", "Ubezpieczenia", "Transport - Ubezpieczenia pojazdów"),
    code!("7/5", "Opłaty", "Transport - Opłaty drogowe i postojowe"),
    code!("7/6", "Logistyka zewnętrzna", "Transport - Transport i dostawa"),
    code!("7/7", "Flota", "Transport - Zarządzanie flotą"),
    code!("7/8", "Technologie", "Transport - GPS, tracking, systemy"),
    code!("8/1", "Meble", "Wyposażenie - Meble i wyposażenie biurowe"),
    code!("8/2", "Komputery", "Wyposażenie - Sprzęt komputerowy"),
    code!("8/3", "Maszyny", "Wyposażenie - Maszyny i urządzenia przemysłowe"),
    code!("8/4", "Narzędzia", "Wyposażenie - Narzędzia i sprzęt"),
    code!("8/5", "Elektronika", "Wyposażenie - Urządzenia elektroniczne"),
    code!("8/6", "Oprogramowanie", "Wyposażenie - Licencje i oprogramowanie"),
    code!("8/7", "Bezpieczeństwo", "Wyposażenie - Systemy bezpieczeństwa"),
    code!("8/8", "Infrastruktura", "Wyposażenie - Infrastruktura techniczna"),
    code!("9/1", "Szkolenia", "Pozostałe - Szkolenia i kursy"),
    code!("9/2", "Doradztwo", "Pozostałe - Usługi doradcze"),
    code!("9/3", "Ubezpieczenia", "Pozostałe - Ubezpieczenia firmowe"),
    code!("9/4", "Podróże", "Pozostałe - Podróże służbowe"),
    code!("9/5", "Reprezentacja", "Pozostałe - Koszty reprezentacyjne"),
    code!("9/6", "Opłaty", "Pozostałe - Opłaty administracyjne"),
    code!("9/7", "Usługi finansowe", "Pozostałe - Bankowość i finanse"),
    code!("9/8", "Inne", "Pozostałe - Pozostałe wydatki"),
];

/// Category by catalog id.
pub fn category(id: &str) -> Option<&'static Category> {
    CATEGORIES.iter().find(|c| c.id == id)
}

/// Whether `code` names a known MPK code or catalog MPK.
pub fn is_known_mpk(code: &str) -> bool {
    MPK_OPTIONS.iter().any(|o| o.code == code) || CATEGORIES.iter().any(|c| c.mpk == code)
}

/// Whether `code` names a known group code or catalog group.
pub fn is_known_group(code: &str) -> bool {
    GROUP_OPTIONS.iter().any(|o| o.code == code) || CATEGORIES.iter().any(|c| c.group == code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_catalog_ids_are_unique() {
        let ids: HashSet<_> = CATEGORIES.iter().map(|c| c.id).collect();
        assert_eq!(ids.len(), CATEGORIES.len());
        assert!(CATEGORIES.iter().all(|c| !c.keywords.is_empty()));
    }

    #[test]
    fn test_code_lookups() {
        assert_eq!(category("transport-fuel").map(|c| c.mpk), Some("MPK710"));
        assert!(is_known_mpk("MPK990"));
        assert!(is_known_mpk("MPK197"));
        assert!(is_known_group("7/10"));
        assert!(!is_known_group("6/1"));
    }
}
