use serde::{Deserialize, Serialize};

use super::domain::{Scale, ScaleId, ScaleLevel, StabilityFormula};
use super::scale::{validate_scale, ScaleDefinitionError};

const STANDARD_SCALES: [(&str, &str, &[&str; 14]); 5] = [
    ("humeur", "Échelle de l'Humeur (Dépression ←→ Manie)", &HUMEUR_LEVELS),
    ("irritabilite", "Échelle d'Irritabilité", &IRRITABILITE_LEVELS),
    ("confiance", "Échelle de Confiance en soi", &CONFIANCE_LEVELS),
    ("extraversion", "Échelle d'Extraversion (Sociabilité)", &EXTRAVERSION_LEVELS),
    ("bien_etre", "Échelle de Bien-être (Anxiété inversée)", &BIEN_ETRE_LEVELS),
];

const HUMEUR_LEVELS: [&str; 14] = [
    "Détresse absolue : désespoir intense, idées suicidaires ou grande souffrance psychique.",
    "Dépression très sévère : incapacité quasi totale à fonctionner, tristesse omniprésente.",
    "Dépression marquée : pleurs fréquents, sentiment de culpabilité ou d'inutilité prononcé.",
    "Dépression modérée : fatigue importante, ralentissement, difficultés à éprouver du plaisir.",
    "Déprime notable : humeur morose la majeure partie du temps, mais moments de répit.",
    "Légère dépression : pessimisme, baisse de motivation, on arrive cependant à faire l'essentiel.",
    "Humeur légèrement basse : tristesse diffuse, mais capacité à fonctionner presque normale.",
    "Humeur neutre : ni tristesse majeure, ni euphorie, sentiment d'équilibre.",
    "Humeur positive : bonne énergie, optimisme modéré, on se sent assez bien.",
    "Humeur assez élevée : enthousiasme, vitalité, légère euphorie possible.",
    "Humeur haute : exaltation, créativité, possible tendance à parler beaucoup plus vite.",
    "Hypomanie : énergie débordante, insomnie ou besoin de sommeil réduit, irritabilité potentielle.",
    "Forte hypomanie / proche manie : sentiment de toute-puissance, impulsivité accrue, difficulté à se concentrer.",
    "Manie : euphorie ou irritabilité extrême, risque de comportements dangereux, déconnexion partielle de la réalité.",
];

const IRRITABILITE_LEVELS: [&str; 14] = [
    "Zéro irritation : calme parfait, aucune colère.",
    "Très légèrement irritable : un agacement bref possible, mais vite maîtrisé.",
    "Irritabilité faible : on peut s'énerver un peu si contrarié, mais globalement on reste posé.",
    "Irritabilité modérée : on se sent facilement agacé, tension notable, mais pas d'explosion.",
    "Fréquent agacement : on \"bouillonne\" plus facilement, impatience récurrente.",
    "Agacement soutenu : début de hausse de ton, possibilité de paroles sèches ou agressives.",
    "Montée de colère : on se braque rapidement, tendance à réagir vivement à la moindre contrariété.",
    "Irritabilité moyenne : on s'énerve lorsqu'une limite est franchie, mais ça reste gérable.",
    "Irritabilité forte : la colère affleure souvent, conflits plus fréquents.",
    "Colère récurrente : hausse du volume sonore, propos blessants ou impulsifs.",
    "Irritabilité très marquée : peu de patience, accès de colère parfois soudains.",
    "Colère explosive potentielle : on peine à se retenir, réactions excessives.",
    "Agressivité réelle : on peut crier, avoir des gestes brusques ou violents, tension permanente.",
    "Irritabilité extrême : colère quasi constante, impossibilité de se calmer, situation dangereuse ou incontrôlée.",
];

const CONFIANCE_LEVELS: [&str; 14] = [
    "Auto-dévalorisation totale : sentiment d'infériorité, honte, incapacité perçue dans tous les domaines.",
    "Confiance minimale : énorme doute de soi, peur de l'échec, évitement massif.",
    "Très faible estime : impression de compétence quasi nulle, on se sent « moins bon » que tout le monde.",
    "Confiance limitée : hésitation à prendre la parole, crainte du jugement, mais quelques rares moments d'assurance.",
    "Confiance timide : on ose un peu, mais on a besoin d'encouragement ou de validation.",
    "Confiance en soi sous la moyenne : quelques appréhensions, sentiment de ne pas être au top.",
    "Légère assurance : on arrive à agir, malgré des doutes, on fonctionne « passablement ».",
    "Confiance moyenne : on se sent plutôt à l'aise, tout en restant conscient de ses limites.",
    "Bonne estime : aisance relationnelle, on s'exprime avec moins de crainte, on se sent capable.",
    "Confiance solide : on croit en ses capacités, on prend des initiatives, peu d'auto-sabotage.",
    "Forte assurance : on se sait compétent dans plusieurs domaines, on n'hésite pas à s'exposer.",
    "Surconfiance : on commence à surestimer ses capacités, on sous-estime les risques.",
    "Mégalomanie légère : sentiment de supériorité net, on se croit capable de tout, possible manque d'empathie.",
    "Surconfiance extrême : mégalomanie franche, sentiment d'invincibilité, risques majeurs de comportements imprudents.",
];

const EXTRAVERSION_LEVELS: [&str; 14] = [
    "Fermeture totale : envie de voir personne, isolement complet, évitement extrême.",
    "Sociabilité quasi nulle : on sort ou contacte autrui uniquement si on n'a pas le choix.",
    "Faible sociabilité : on supporte quelques rares échanges, mais avec réticence.",
    "Introversion marquée : on préfère être seul, on accepte un peu de compagnie ponctuellement.",
    "Plutôt réservé : on peut apprécier certaines rencontres, mais on a besoin de beaucoup de temps seul.",
    "Légèrement introverti : on participe un minimum, sans aller spontanément vers les autres.",
    "Légère préférence pour la solitude : on ne fuit pas la compagnie, mais on n'en a pas un grand besoin.",
    "Extraversion moyenne : à l'aise tant seul qu'en groupe, pas de forte préférence.",
    "Sociable : plaisir à interagir, on va parfois vers de nouvelles connaissances.",
    "Extraverti : on aime être en groupe, on parle volontiers, on cherche activement des contacts.",
    "Très sociable : on a souvent besoin de voir du monde, on déteste rester seul trop longtemps.",
    "Extraversion marquée : on multiplie les rencontres, recherche permanente de stimulation sociale.",
    "Hyper-extraversion : on ne supporte presque pas la solitude, on a besoin d'attention quasi constante.",
    "Exubérance totale : on veut être entouré en permanence, on se sent « éteint » sans public, risque d'agitation sociale.",
];

const BIEN_ETRE_LEVELS: [&str; 14] = [
    "Détresse totale : panique, terreur, crises d'angoisse fortes, sensation d'être en danger permanent.",
    "Anxiété intense : stress constant, tensions physiques, hypervigilance, on se sent submergé.",
    "Anxiété très élevée : nombreuses inquiétudes, ruminations quasi continues, difficulté à se calmer.",
    "Grande anxiété : on fait face, mais avec beaucoup de mal, troubles du sommeil fréquents.",
    "Anxiété modérée-forte : préoccupations récurrentes, sensations corporelles de stress (maux de ventre, etc.).",
    "Anxiété sensible : on est souvent tendu, mais on parvient parfois à se détendre.",
    "Anxiété moyenne : préoccupations, mais on peut connaître des moments de calme.",
    "Équilibre neutre : niveau « normal » de stress, globalement gérable.",
    "Bien-être modéré : on se sent plutôt serein, la nervosité est occasionnelle.",
    "Bonne détente : on est relativement confiant, anxiété légère et sporadique.",
    "Niveau de bien-être élevé : on se sent calme la plupart du temps, peu de stress.",
    "Sérénité importante : peu de pensées anxieuses, sentiment de paix assez stable.",
    "Profonde tranquillité : anxiété très rare, sentiment de bien-être presque constant.",
    "Bien-être total : aucune angoisse, grande sérénité intérieure, sentiment de sécurité absolue.",
];

/// Every standard scale weighs the same; irritability is inverted.
pub const DEFAULT_FORMULA: &str =
    "humeur:1,irritabilite:1:true,confiance:1,extraversion:1,bien_etre:1";

/// Scales and stability formulas known to the system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScaleCatalog {
    pub scales: Vec<Scale>,
    #[serde(default)]
    pub formulas: Vec<StabilityFormula>,
}

impl ScaleCatalog {
    /// The system default scales, each ranging 0-13, with the default formula.
    pub fn standard() -> Self {
        let scales = STANDARD_SCALES
            .iter()
            .map(|(id, description, levels)| {
                let mut scale = Scale::new(*id, *id, 0, 13);
                scale.description = description.to_string();
                scale.levels = (0..)
                    .zip(levels.iter())
                    .map(|(level, description)| ScaleLevel {
                        level,
                        description: description.to_string(),
                    })
                    .collect();
                scale
            })
            .collect();

        let formula = StabilityFormula {
            id: "default".to_string(),
            user_id: None,
            formula: DEFAULT_FORMULA.to_string(),
            description: "Formule par défaut, toutes les échelles ayant le même poids sauf irritabilité qui est inversée".to_string(),
            is_default: true,
            is_active: true,
            scale_weights: Vec::new(),
        };

        Self {
            scales,
            formulas: vec![formula],
        }
    }

    pub fn scale_ids(&self) -> Vec<ScaleId> {
        self.scales.iter().map(|scale| scale.id.clone()).collect()
    }

    /// Checks every scale definition, reporting the first invalid scale.
    pub fn validate(&self) -> Result<(), CatalogError> {
        for scale in &self.scales {
            let errors = validate_scale(scale);
            if !errors.is_empty() {
                return Err(CatalogError::InvalidScale {
                    scale_id: scale.id.clone(),
                    errors,
                });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CatalogError {
    #[error("scale {scale_id} is invalid: {}", describe(.errors))]
    InvalidScale {
        scale_id: ScaleId,
        errors: Vec<ScaleDefinitionError>,
    },
}

fn describe(errors: &[ScaleDefinitionError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
