//! The 58 Algerian wilayas with their default shipping price in DZD.

/// (code, Arabic name, English name, default price)
pub const WILAYAS: [(i32, &str, &str, i64); 58] = [
    (1, "أدرار", "Adrar", 1400),
    (2, "الشلف", "Chlef", 700),
    (3, "الأغواط", "Laghouat", 900),
    (4, "أم البواقي", "Oum El Bouaghi", 800),
    (5, "باتنة", "Batna", 800),
    (6, "بجاية", "Bejaia", 700),
    (7, "بسكرة", "Biskra", 900),
    (8, "بشار", "Bechar", 1200),
    (9, "البليدة", "Blida", 500),
    (10, "البويرة", "Bouira", 600),
    (11, "تمنراست", "Tamanrasset", 1600),
    (12, "تبسة", "Tebessa", 900),
    (13, "تلمسان", "Tlemcen", 800),
    (14, "تيارت", "Tiaret", 800),
    (15, "تيزي وزو", "Tizi Ouzou", 600),
    (16, "الجزائر", "Algiers", 400),
    (17, "الجلفة", "Djelfa", 900),
    (18, "جيجل", "Jijel", 700),
    (19, "سطيف", "Setif", 700),
    (20, "سعيدة", "Saida", 900),
    (21, "سكيكدة", "Skikda", 800),
    (22, "سيدي بلعباس", "Sidi Bel Abbes", 800),
    (23, "عنابة", "Annaba", 800),
    (24, "قالمة", "Guelma", 800),
    (25, "قسنطينة", "Constantine", 700),
    (26, "المدية", "Medea", 600),
    (27, "مستغانم", "Mostaganem", 700),
    (28, "المسيلة", "M'Sila", 800),
    (29, "معسكر", "Mascara", 800),
    (30, "ورقلة", "Ouargla", 1100),
    (31, "وهران", "Oran", 700),
    (32, "البيض", "El Bayadh", 1000),
    (33, "إليزي", "Illizi", 1600),
    (34, "برج بوعريريج", "Bordj Bou Arreridj", 700),
    (35, "بومرداس", "Boumerdes", 500),
    (36, "الطارف", "El Tarf", 900),
    (37, "تندوف", "Tindouf", 1600),
    (38, "تيسمسيلت", "Tissemsilt", 800),
    (39, "الوادي", "El Oued", 1000),
    (40, "خنشلة", "Khenchela", 900),
    (41, "سوق أهراس", "Souk Ahras", 900),
    (42, "تيبازة", "Tipaza", 500),
    (43, "ميلة", "Mila", 800),
    (44, "عين الدفلى", "Ain Defla", 600),
    (45, "النعامة", "Naama", 1100),
    (46, "عين تموشنت", "Ain Temouchent", 800),
    (47, "غرداية", "Ghardaia", 1000),
    (48, "غليزان", "Relizane", 700),
    (49, "تيميمون", "Timimoun", 1500),
    (50, "برج باجي مختار", "Bordj Badji Mokhtar", 1800),
    (51, "أولاد جلال", "Ouled Djellal", 1000),
    (52, "بني عباس", "Beni Abbes", 1400),
    (53, "عين صالح", "In Salah", 1600),
    (54, "عين قزام", "In Guezzam", 1800),
    (55, "تقرت", "Touggourt", 1100),
    (56, "جانت", "Djanet", 1800),
    (57, "المغير", "El M'Ghair", 1100),
    (58, "المنيعة", "El Meniaa", 1300),
];
